//! Pure fusion planning logic.
//!
//! This crate answers one question: given timber, tender and abidos, how
//! many fusions can be made, and which conversions get there? Functions take
//! plain data and return results. Nothing here touches a network, a chat
//! client or the filesystem, so the same code backs the `abidos` CLI and
//! any future bot front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`command`] | Token parsing, arity checks, reply rendering |
//! | [`constants`] | Per-fusion costs and conversion rates |
//! | [`optimizer`] | Exhaustive conversion search and the solution ledger |
//! | [`rates`] | Configurable rates record and its validation |

pub mod command;
pub mod constants;
pub mod optimizer;
pub mod rates;
