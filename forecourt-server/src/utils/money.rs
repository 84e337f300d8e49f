//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are stored and serialized as `f64` but every comparison and
//! rounding step goes through `Decimal` to avoid float drift.

use rust_decimal::prelude::*;

use crate::utils::{AppError, AppResult};

/// Rounding strategy for monetary values (2 decimal places)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.005)
const MONEY_TOLERANCE: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Maximum allowed amount per movement (10,000,000)
const MAX_AMOUNT: f64 = 10_000_000.0;

fn to_decimal(value: f64, field: &str) -> AppResult<Decimal> {
    Decimal::from_f64(value)
        .ok_or_else(|| AppError::validation(format!("{} is not a valid amount: {}", field, value)))
}

/// Round a monetary value to 2 decimal places (half-up)
pub fn round_money(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(DECIMAL_PLACES))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Compare two monetary values within tolerance
pub fn money_eq(a: f64, b: f64) -> bool {
    match (Decimal::from_f64(a), Decimal::from_f64(b)) {
        (Some(da), Some(db)) => (da - db).abs() < MONEY_TOLERANCE,
        _ => false,
    }
}

/// Validate an amount supplied by a client: finite, positive, bounded
pub fn require_valid_amount(value: f64, field: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{} must be a finite number, got {}",
            field, value
        )));
    }
    let d = to_decimal(value, field)?;
    if d <= Decimal::ZERO {
        return Err(AppError::validation(format!(
            "{} must be positive, got {}",
            field, value
        )));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field, MAX_AMOUNT, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(29999.999), 30000.0);
        assert_eq!(round_money(19.995), 20.0);
        assert_eq!(round_money(19.994), 19.99);
    }

    #[test]
    fn test_money_eq_tolerance() {
        assert!(money_eq(30000.0, 30000.0));
        assert!(money_eq(30000.0, 30000.001));
        assert!(!money_eq(30000.0, 30000.01));
        assert!(!money_eq(30000.0, f64::NAN));
    }

    #[test]
    fn test_require_valid_amount() {
        assert!(require_valid_amount(30000.0, "amount").is_ok());
        assert!(require_valid_amount(0.0, "amount").is_err());
        assert!(require_valid_amount(-5.0, "amount").is_err());
        assert!(require_valid_amount(f64::INFINITY, "amount").is_err());
        assert!(require_valid_amount(20_000_000.0, "amount").is_err());
    }
}
