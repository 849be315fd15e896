//! Command adapter — text tokens in, reply text out.
//!
//! Accepts exactly three tokens. Each must be a whole number, written
//! plainly (`1000`), with a zero fraction (`4.0`) or in scientific notation
//! (`1e3`). Every failure renders as the same short reply so chat users see
//! one message, while callers can still match on [`NoSolution`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::optimizer::{optimize_with, NoSolution, ResourcePool, Solution};
use crate::rates::ConversionRates;

/// Reply for every [`NoSolution`] outcome.
pub const NO_SOLUTION_REPLY: &str = "cant make any";

/// Help text for the optimize command.
pub const USAGE: &str = "Calculate maximum possible fusions from given resources
Usage: optimize <timber> <tender> <abidos>
Example: optimize 1000 500 100";

/// Token rejected before the optimizer runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("expected 3 arguments, got {0}")]
    WrongArity(usize),
    #[error("not a number: {0:?}")]
    NotANumber(String),
    #[error("not a whole number: {0:?}")]
    NonIntegral(String),
    #[error("whole number out of range: {0:?}")]
    OutOfRange(String),
}

/// A bare run of digits with an optional sign.
fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(|c| c == '+' || c == '-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Digits with an optional sign and at most one decimal point.
fn is_decimal_literal(text: &str) -> bool {
    let body = text.strip_prefix(|c| c == '+' || c == '-').unwrap_or(text);
    let mut digits = 0;
    let mut points = 0;
    for b in body.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}

/// Drop trailing fractional zeros, so `4.000…0` of any length parses exactly.
fn trim_fraction(literal: &str) -> &str {
    if !literal.contains('.') {
        return literal;
    }
    let trimmed = literal.trim_end_matches('0').trim_end_matches('.');
    if trimmed.bytes().any(|b| b.is_ascii_digit()) {
        trimmed
    } else {
        "0"
    }
}

/// Parse a plain decimal literal without rounding.
fn parse_exact(literal: &str, token: &str) -> Result<Decimal, InputError> {
    if !is_decimal_literal(literal) {
        return Err(InputError::NotANumber(token.to_string()));
    }
    let literal = trim_fraction(literal);
    Decimal::from_str_exact(literal).map_err(|_| {
        // A fraction left after trimming ends in a non-zero digit.
        if literal.contains('.') {
            InputError::NonIntegral(token.to_string())
        } else {
            InputError::OutOfRange(token.to_string())
        }
    })
}

/// Parse `<mantissa>e<exponent>`. A scale the decimal type cannot hold means
/// the value is too large (positive exponent) or has a fraction (negative).
fn parse_scientific(mantissa: &str, exponent: &str, token: &str) -> Result<Decimal, InputError> {
    let base = parse_exact(mantissa, token)?;
    if !is_integer_literal(exponent) {
        return Err(InputError::NotANumber(token.to_string()));
    }
    if base.is_zero() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_scientific(&format!("{base}e{exponent}")).map_err(|_| {
        if exponent.starts_with('-') {
            InputError::NonIntegral(token.to_string())
        } else {
            InputError::OutOfRange(token.to_string())
        }
    })
}

/// Parse one resource quantity.
pub fn parse_quantity(token: &str) -> Result<i64, InputError> {
    let trimmed = token.trim();
    let value = match trimmed.split_once(|c| c == 'e' || c == 'E') {
        Some((mantissa, exponent)) => parse_scientific(mantissa, exponent, token)?,
        None => parse_exact(trimmed, token)?,
    };
    if !value.fract().is_zero() {
        return Err(InputError::NonIntegral(token.to_string()));
    }
    value
        .to_i64()
        .ok_or_else(|| InputError::OutOfRange(token.to_string()))
}

/// Parse `timber tender abidos` into a pool.
pub fn parse_resources<S: AsRef<str>>(args: &[S]) -> Result<ResourcePool, InputError> {
    let [timber, tender, abidos] = args else {
        return Err(InputError::WrongArity(args.len()));
    };
    Ok(ResourcePool::new(
        parse_quantity(timber.as_ref())?,
        parse_quantity(tender.as_ref())?,
        parse_quantity(abidos.as_ref())?,
    ))
}

/// Parse the tokens and run the optimizer. Rejected input never reaches the
/// search.
pub fn run_command<S: AsRef<str>>(
    args: &[S],
    rates: &ConversionRates,
) -> Result<Solution, NoSolution> {
    let pool = parse_resources(args)?;
    optimize_with(pool, rates)
}

/// Render an optimizer outcome as reply text.
pub fn render_reply(result: &Result<Solution, NoSolution>, rates: &ConversionRates) -> String {
    let solution = match result {
        Ok(solution) => solution,
        Err(_) => return NO_SOLUTION_REPLY.to_string(),
    };
    let used = solution.fusion_consumption(rates);

    format!(
        "**Resource Optimization Results:**
Maximum possible fusions: {fusions}

**Optimal conversion strategy:**
Convert {timber_converted} timber to lumber powder
Convert {tender_converted} tender to lumber powder

**Conversion details:**
Lumber powder created: {lumber}
New abidos from conversion: {new_abidos}

**Remaining resources after ALL conversions and fusions:**
Timber: {timber_left}
Tender: {tender_left}
Abidos: {abidos_left}

**Verification:**
Resources used in fusions:
Timber used: {timber_used}
Tender used: {tender_used}
Abidos used: {abidos_used}",
        fusions = solution.max_fusions,
        timber_converted = solution.timber_converted,
        tender_converted = solution.tender_converted,
        lumber = solution.lumber_powder_created,
        new_abidos = solution.new_abidos_from_conversion,
        timber_left = solution.remaining_timber,
        tender_left = solution.remaining_tender,
        abidos_left = solution.remaining_abidos,
        timber_used = used.timber,
        tender_used = used.tender,
        abidos_used = used.abidos,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rates() -> ConversionRates {
        ConversionRates::default()
    }

    #[test]
    fn test_parse_plain_integer() {
        assert_eq!(parse_quantity("1000"), Ok(1000));
        assert_eq!(parse_quantity(" 42 "), Ok(42));
        assert_eq!(parse_quantity("-7"), Ok(-7));
    }

    #[test]
    fn test_parse_integral_decimal() {
        assert_eq!(parse_quantity("4.0"), Ok(4));
        assert_eq!(parse_quantity("100.000"), Ok(100));
    }

    #[test]
    fn test_parse_long_zero_fraction() {
        assert_eq!(parse_quantity("4.000000000000000000000000000000000"), Ok(4));
        assert_eq!(parse_quantity("-0.00000000000000000000000000000000"), Ok(0));
    }

    #[test]
    fn test_parse_scientific() {
        assert_eq!(parse_quantity("1e3"), Ok(1000));
        assert_eq!(parse_quantity("1E3"), Ok(1000));
        assert_eq!(parse_quantity("1e+3"), Ok(1000));
        assert_eq!(parse_quantity("50e-1"), Ok(5));
        assert_eq!(parse_quantity("4.5e1"), Ok(45));
        assert_eq!(parse_quantity("0e99"), Ok(0));
    }

    #[test]
    fn test_parse_scientific_fraction() {
        for token in ["5e-1", "5e-40", "1e-99999999999"] {
            assert_eq!(
                parse_quantity(token),
                Err(InputError::NonIntegral(token.to_string()))
            );
        }
    }

    #[test]
    fn test_parse_scientific_out_of_range() {
        for token in ["1e19", "1e30", "-1e30", "1e99999999999"] {
            assert_eq!(
                parse_quantity(token),
                Err(InputError::OutOfRange(token.to_string()))
            );
        }
    }

    #[test]
    fn test_parse_rejects_fraction() {
        assert_eq!(
            parse_quantity("4.5"),
            Err(InputError::NonIntegral("4.5".to_string()))
        );
    }

    #[test]
    fn test_parse_long_fraction_is_not_rounded() {
        // Past 28 fractional digits a lossy parse would round these to 86, 4 and 1.
        for token in [
            "85.99999999999999999999999999999",
            "4.00000000000000000000000000001",
            "0.99999999999999999999999999999",
        ] {
            assert_eq!(
                parse_quantity(token),
                Err(InputError::NonIntegral(token.to_string()))
            );
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(
            parse_quantity("lots"),
            Err(InputError::NotANumber("lots".to_string()))
        );
        assert!(matches!(
            parse_quantity(""),
            Err(InputError::NotANumber(_))
        ));
        for token in ["NaN", "1e", "e5", "1e3.5", "1.2.3", "--4"] {
            assert_eq!(
                parse_quantity(token),
                Err(InputError::NotANumber(token.to_string()))
            );
        }
    }

    #[test]
    fn test_parse_out_of_range() {
        assert!(matches!(
            parse_quantity("9223372036854775808"),
            Err(InputError::OutOfRange(_))
        ));
        assert!(matches!(
            parse_quantity("123456789012345678901234567890123"),
            Err(InputError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_wrong_arity() {
        assert_eq!(
            parse_resources(&["1000", "500"]),
            Err(InputError::WrongArity(2))
        );
        assert_eq!(
            parse_resources(&["1", "2", "3", "4"]),
            Err(InputError::WrongArity(4))
        );
        let none: [&str; 0] = [];
        assert_eq!(parse_resources(&none), Err(InputError::WrongArity(0)));
    }

    #[test]
    fn test_parse_resources() {
        assert_eq!(
            parse_resources(&["1000", "500.0", "66"]),
            Ok(ResourcePool::new(1000, 500, 66))
        );
    }

    #[test]
    fn test_run_command_invalid_input() {
        assert_eq!(
            run_command(&["86", "45", "4.5"], &rates()),
            Err(NoSolution::InvalidInput(InputError::NonIntegral(
                "4.5".to_string()
            )))
        );
    }

    #[test]
    fn test_run_command_long_fraction_below_threshold() {
        let token = "85.99999999999999999999999999999";
        assert_eq!(
            run_command(&[token, "45", "33"], &rates()),
            Err(NoSolution::InvalidInput(InputError::NonIntegral(
                token.to_string()
            )))
        );
    }

    #[test]
    fn test_run_command_solves() {
        let s = run_command(&["86", "45", "33"], &rates()).unwrap();
        assert_eq!(s.max_fusions, 1);
    }

    #[test]
    fn test_every_failure_renders_same_reply() {
        let failures = [
            run_command(&["1", "2"], &rates()),
            run_command(&["85", "45", "33"], &rates()),
            run_command(&["186", "95", "9223372036854775807"], &rates()),
        ];
        for failure in &failures {
            assert!(failure.is_err());
            assert_eq!(render_reply(failure, &rates()), NO_SOLUTION_REPLY);
        }
    }

    #[test]
    fn test_render_solution() {
        let result = run_command(&["1000", "500", "66"], &rates());
        let reply = render_reply(&result, &rates());
        assert!(reply.starts_with("**Resource Optimization Results:**\n"));
        assert!(reply.contains("Maximum possible fusions: 4\n"));
        assert!(reply.contains("Convert 300 timber to lumber powder\n"));
        assert!(reply.contains("Convert 300 tender to lumber powder\n"));
        assert!(reply.contains("Lumber powder created: 720\n"));
        assert!(reply.contains("New abidos from conversion: 70\n"));
        assert!(reply.contains("Timber: 356\nTender: 20\nAbidos: 4\n"));
        assert!(reply.ends_with("Timber used: 344\nTender used: 180\nAbidos used: 132"));
    }
}
