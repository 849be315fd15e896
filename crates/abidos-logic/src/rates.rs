//! Conversion rate configuration.
//!
//! The optimizer runs against a [`ConversionRates`] record. Its default is
//! the fixed table in [`crate::constants`]; a JSON file may override any
//! subset of fields, the rest fall back to the defaults.
//!
//! ```
//! use abidos_logic::rates::{validate_rates, ConversionRates};
//!
//! let rates = ConversionRates::default();
//! assert_eq!(rates.fusion_timber, 86);
//! assert!(validate_rates(&rates).is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{conversion, fusion, lumber};

/// Per-fusion costs and conversion rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionRates {
    pub fusion_timber: i64,
    pub fusion_tender: i64,
    pub fusion_abidos: i64,
    /// Timber consumed per conversion step.
    pub timber_unit: i64,
    /// Lumber powder per timber step.
    pub timber_yield: i64,
    /// Tender consumed per conversion step.
    pub tender_unit: i64,
    /// Lumber powder per tender step.
    pub tender_yield: i64,
    /// Lumber powder consumed per abidos batch.
    pub lumber_unit: i64,
    /// Abidos produced per batch.
    pub lumber_yield: i64,
}

impl Default for ConversionRates {
    fn default() -> Self {
        Self {
            fusion_timber: fusion::TIMBER,
            fusion_tender: fusion::TENDER,
            fusion_abidos: fusion::ABIDOS,
            timber_unit: conversion::TIMBER_UNIT,
            timber_yield: conversion::TIMBER_YIELD,
            tender_unit: conversion::TENDER_UNIT,
            tender_yield: conversion::TENDER_YIELD,
            lumber_unit: lumber::ABIDOS_UNIT,
            lumber_yield: lumber::ABIDOS_YIELD,
        }
    }
}

impl ConversionRates {
    /// Named view of every field, used by validation and error reporting.
    fn fields(&self) -> [(&'static str, i64); 9] {
        [
            ("fusion_timber", self.fusion_timber),
            ("fusion_tender", self.fusion_tender),
            ("fusion_abidos", self.fusion_abidos),
            ("timber_unit", self.timber_unit),
            ("timber_yield", self.timber_yield),
            ("tender_unit", self.tender_unit),
            ("tender_yield", self.tender_yield),
            ("lumber_unit", self.lumber_unit),
            ("lumber_yield", self.lumber_yield),
        ]
    }
}

/// Rates validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatesError {
    /// Costs and units divide the pool; zero would trap, negative would loop.
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: i64 },
}

/// Validate a rates record, returning all errors found.
pub fn validate_rates(rates: &ConversionRates) -> Vec<RatesError> {
    rates
        .fields()
        .into_iter()
        .filter(|(_, value)| *value <= 0)
        .map(|(field, value)| RatesError::NotPositive { field, value })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constants() {
        let rates = ConversionRates::default();
        assert_eq!(rates.fusion_timber, 86);
        assert_eq!(rates.fusion_tender, 45);
        assert_eq!(rates.fusion_abidos, 33);
        assert_eq!(rates.timber_unit, 100);
        assert_eq!(rates.tender_unit, 50);
        assert_eq!(rates.timber_yield, 80);
        assert_eq!(rates.tender_yield, 80);
        assert_eq!(rates.lumber_unit, 100);
        assert_eq!(rates.lumber_yield, 10);
    }

    #[test]
    fn test_default_is_valid() {
        assert!(validate_rates(&ConversionRates::default()).is_empty());
    }

    #[test]
    fn test_zero_unit_rejected() {
        let rates = ConversionRates {
            tender_unit: 0,
            ..Default::default()
        };
        assert_eq!(
            validate_rates(&rates),
            vec![RatesError::NotPositive {
                field: "tender_unit",
                value: 0
            }]
        );
    }

    #[test]
    fn test_reports_every_error() {
        let rates = ConversionRates {
            fusion_abidos: -1,
            lumber_unit: 0,
            lumber_yield: 0,
            ..Default::default()
        };
        assert_eq!(validate_rates(&rates).len(), 3);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let rates: ConversionRates = serde_json::from_str(r#"{"lumber_yield": 12}"#).unwrap();
        assert_eq!(rates.lumber_yield, 12);
        assert_eq!(rates.fusion_timber, 86);
        assert_eq!(rates.tender_unit, 50);
    }

    #[test]
    fn test_error_message() {
        let err = RatesError::NotPositive {
            field: "timber_unit",
            value: -4,
        };
        assert_eq!(err.to_string(), "timber_unit must be positive, got -4");
    }
}
