//! Fusion constants — per-fusion costs and conversion rates.
//!
//! Plain `i64` constants with no runtime dependency. Both the optimizer
//! defaults and the command reply breakdown read from here.

/// Resources consumed by a single fusion.
pub mod fusion {
    pub const TIMBER: i64 = 86;
    pub const TENDER: i64 = 45;
    pub const ABIDOS: i64 = 33;
}

/// Timber and tender → lumber powder conversion steps.
pub mod conversion {
    /// Timber consumed per conversion step.
    pub const TIMBER_UNIT: i64 = 100;
    /// Lumber powder produced per timber step.
    pub const TIMBER_YIELD: i64 = 80;
    /// Tender consumed per conversion step.
    pub const TENDER_UNIT: i64 = 50;
    /// Lumber powder produced per tender step.
    pub const TENDER_YIELD: i64 = 80;
}

/// Lumber powder → abidos batches. Powder below one batch is stranded.
pub mod lumber {
    pub const ABIDOS_UNIT: i64 = 100;
    pub const ABIDOS_YIELD: i64 = 10;
}
