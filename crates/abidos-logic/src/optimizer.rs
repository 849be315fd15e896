//! Fusion optimizer — exhaustive search over timber and tender conversions.
//!
//! Converting timber or tender produces lumber powder, and every full batch
//! of powder becomes abidos. Spending raw materials on conversion can
//! therefore raise the fusion count when abidos is the bottleneck. The
//! optimizer tries every `(timber_steps, tender_steps)` pair within the pool
//! and keeps the first plan, in ascending order, that reaches the best
//! fusion count.
//!
//! ```
//! use abidos_logic::optimizer::optimize;
//!
//! let solution = optimize(1000, 500, 66).unwrap();
//! assert_eq!(solution.max_fusions, 4);
//! assert_eq!(solution.timber_converted, 300);
//! assert_eq!(solution.tender_converted, 300);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::InputError;
use crate::rates::ConversionRates;

/// One of the three raw resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    Timber,
    Tender,
    Abidos,
}

impl Resource {
    pub fn name(self) -> &'static str {
        match self {
            Resource::Timber => "timber",
            Resource::Tender => "tender",
            Resource::Abidos => "abidos",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Starting quantities handed to the optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourcePool {
    pub timber: i64,
    pub tender: i64,
    pub abidos: i64,
}

impl ResourcePool {
    pub fn new(timber: i64, tender: i64, abidos: i64) -> Self {
        Self {
            timber,
            tender,
            abidos,
        }
    }
}

/// Number of conversion steps applied to each material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Plan {
    pub timber_steps: i64,
    pub tender_steps: i64,
}

/// Best conversion plan plus the full resource ledger after fusing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Solution {
    pub max_fusions: i64,
    /// Timber spent on conversion (a multiple of the timber unit).
    pub timber_converted: i64,
    /// Tender spent on conversion (a multiple of the tender unit).
    pub tender_converted: i64,
    pub lumber_powder_created: i64,
    pub new_abidos_from_conversion: i64,
    pub remaining_timber: i64,
    pub remaining_tender: i64,
    pub remaining_abidos: i64,
}

impl Solution {
    /// Resources consumed by the fusions themselves, for the verification
    /// breakdown. Saturates instead of overflowing on hand-built values.
    pub fn fusion_consumption(&self, rates: &ConversionRates) -> ResourcePool {
        ResourcePool {
            timber: self.max_fusions.saturating_mul(rates.fusion_timber),
            tender: self.max_fusions.saturating_mul(rates.fusion_tender),
            abidos: self.max_fusions.saturating_mul(rates.fusion_abidos),
        }
    }
}

/// Why no solution was produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoSolution {
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    /// The starting pool cannot pay for a single fusion. Checked before
    /// conversions are modelled.
    #[error("not enough {resource}: have {have}, need {need}")]
    Insufficient {
        resource: Resource,
        have: i64,
        need: i64,
    },
    #[error("arithmetic overflow while searching")]
    ArithmeticOverflow,
    #[error("no conversion plan yields a fusion")]
    NothingCraftable,
}

fn mul(a: i64, b: i64) -> Result<i64, NoSolution> {
    a.checked_mul(b).ok_or(NoSolution::ArithmeticOverflow)
}

fn add(a: i64, b: i64) -> Result<i64, NoSolution> {
    a.checked_add(b).ok_or(NoSolution::ArithmeticOverflow)
}

fn sub(a: i64, b: i64) -> Result<i64, NoSolution> {
    a.checked_sub(b).ok_or(NoSolution::ArithmeticOverflow)
}

/// Floor division; a zero divisor counts as an arithmetic failure.
fn div(a: i64, b: i64) -> Result<i64, NoSolution> {
    a.checked_div_euclid(b).ok_or(NoSolution::ArithmeticOverflow)
}

/// Reject pools that cannot pay for one fusion from raw stock.
fn precheck(pool: &ResourcePool, rates: &ConversionRates) -> Result<(), NoSolution> {
    let needs = [
        (Resource::Timber, pool.timber, rates.fusion_timber),
        (Resource::Tender, pool.tender, rates.fusion_tender),
        (Resource::Abidos, pool.abidos, rates.fusion_abidos),
    ];
    match needs.into_iter().find(|(_, have, need)| have < need) {
        Some((resource, have, need)) => Err(NoSolution::Insufficient {
            resource,
            have,
            need,
        }),
        None => Ok(()),
    }
}

/// Upper bounds (inclusive) on timber and tender conversion steps.
fn step_bounds(pool: &ResourcePool, rates: &ConversionRates) -> Result<(i64, i64), NoSolution> {
    Ok((
        div(pool.timber, rates.timber_unit)?,
        div(pool.tender, rates.tender_unit)?,
    ))
}

/// Number of plans the exhaustive search would evaluate for `pool`.
///
/// Returns `None` when the pool fails the pre-check or the bounds cannot be
/// computed. Callers use this to refuse inputs that exceed a time budget.
pub fn search_space(pool: ResourcePool, rates: &ConversionRates) -> Option<u128> {
    precheck(&pool, rates).ok()?;
    let (timber_max, tender_max) = step_bounds(&pool, rates).ok()?;
    let timber_plans = u128::try_from(timber_max).ok()? + 1;
    let tender_plans = u128::try_from(tender_max).ok()? + 1;
    timber_plans.checked_mul(tender_plans)
}

/// Apply one conversion plan and fuse as many times as the result allows.
///
/// The returned record describes this plan only; `max_fusions` is the
/// fusion count for the plan, which may be zero. Plans beyond the search
/// bounds are not rejected and produce negative remainders.
pub fn evaluate_plan(
    pool: ResourcePool,
    rates: &ConversionRates,
    plan: Plan,
) -> Result<Solution, NoSolution> {
    let timber_converted = mul(plan.timber_steps, rates.timber_unit)?;
    let tender_converted = mul(plan.tender_steps, rates.tender_unit)?;
    let timber_left = sub(pool.timber, timber_converted)?;
    let tender_left = sub(pool.tender, tender_converted)?;

    let lumber = add(
        mul(plan.timber_steps, rates.timber_yield)?,
        mul(plan.tender_steps, rates.tender_yield)?,
    )?;
    // Partial batches are stranded, never rounded up.
    let new_abidos = mul(div(lumber, rates.lumber_unit)?, rates.lumber_yield)?;
    let abidos_total = add(pool.abidos, new_abidos)?;

    let fusions = div(timber_left, rates.fusion_timber)?
        .min(div(tender_left, rates.fusion_tender)?)
        .min(div(abidos_total, rates.fusion_abidos)?);

    Ok(Solution {
        max_fusions: fusions,
        timber_converted,
        tender_converted,
        lumber_powder_created: lumber,
        new_abidos_from_conversion: new_abidos,
        remaining_timber: sub(timber_left, mul(fusions, rates.fusion_timber)?)?,
        remaining_tender: sub(tender_left, mul(fusions, rates.fusion_tender)?)?,
        remaining_abidos: sub(abidos_total, mul(fusions, rates.fusion_abidos)?)?,
    })
}

/// Maximize fusions for `pool` under the given rates.
///
/// Timber steps form the outer loop and tender steps the inner loop, both
/// ascending. The incumbent is replaced only on strict improvement, so ties
/// resolve to the lexicographically smallest plan.
pub fn optimize_with(pool: ResourcePool, rates: &ConversionRates) -> Result<Solution, NoSolution> {
    precheck(&pool, rates)?;
    let (timber_max, tender_max) = step_bounds(&pool, rates)?;

    let mut best: Option<Solution> = None;
    let mut evaluated: u64 = 0;

    for timber_steps in 0..=timber_max {
        for tender_steps in 0..=tender_max {
            let plan = Plan {
                timber_steps,
                tender_steps,
            };
            let candidate = evaluate_plan(pool, rates, plan)?;
            evaluated += 1;

            let incumbent = best.map_or(0, |b| b.max_fusions);
            if candidate.max_fusions > incumbent {
                log::debug!(
                    "incumbent improved to {} fusions at plan ({}, {})",
                    candidate.max_fusions,
                    timber_steps,
                    tender_steps
                );
                best = Some(candidate);
            }
        }
    }

    log::debug!(
        "search over {:?} finished after {} plans",
        pool,
        evaluated
    );
    best.ok_or(NoSolution::NothingCraftable)
}

/// Maximize fusions using the standard rates.
pub fn optimize(timber: i64, tender: i64, abidos: i64) -> Result<Solution, NoSolution> {
    optimize_with(
        ResourcePool::new(timber, tender, abidos),
        &ConversionRates::default(),
    )
}
