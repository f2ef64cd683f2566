//! Lossless decimal type for monetary amounts, backed by rust_decimal.
//!
//! Amounts are stored and transported losslessly; they only become `f64`
//! at the point where the scoring engine applies its money curve.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lossless decimal amount (e.g. yen spent on merchandise).
///
/// Serializes to a JSON number (not a string).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Create a Decimal from a RustDecimal.
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s.trim()).map(Decimal)
    }

    /// Format the Decimal as a canonical string (no exponent, no trailing zeros).
    pub fn to_canonical_string(&self) -> String {
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    /// Whole-unit amount.
    pub fn from_i64(value: i64) -> Self {
        Decimal(RustDecimal::from(value))
    }

    /// Lossy conversion for numeric curves. Out-of-range values become 0.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::zero(), |acc, d| acc + d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_canonical_strips_trailing_zeros() {
        let decimal = Decimal::from_str_canonical("1200.00").unwrap();
        assert_eq!(decimal.to_canonical_string(), "1200");
    }

    #[test]
    fn test_decimal_parse_trims_whitespace() {
        let decimal = Decimal::from_str_canonical(" 350 ").unwrap();
        assert_eq!(decimal, Decimal::from_i64(350));
    }

    #[test]
    fn test_decimal_json_serialization() {
        let decimal = Decimal::from_str_canonical("10000").unwrap();
        let json = serde_json::to_value(decimal).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "10000.0");
    }

    #[test]
    fn test_decimal_to_f64() {
        let decimal = Decimal::from_str_canonical("2500.5").unwrap();
        assert_eq!(decimal.to_f64(), 2500.5);
    }

    #[test]
    fn test_decimal_sign_helpers() {
        assert!(Decimal::from_i64(-5).is_negative());
        assert!(!Decimal::zero().is_negative());
        assert!(Decimal::zero().is_zero());
    }

    #[test]
    fn test_decimal_sum() {
        let total: Decimal = vec![Decimal::from_i64(1000), Decimal::from_i64(500)]
            .into_iter()
            .sum();
        assert_eq!(total.to_canonical_string(), "1500");
    }
}
