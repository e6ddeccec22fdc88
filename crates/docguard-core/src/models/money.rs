//! Monetary amounts with explicit currency.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount paired with its ISO 4217 currency code.
///
/// Normalizers always emit the `{value, currency}` shape; a missing amount is
/// represented upstream as `Option<MonetaryAmount>`, never as a zero value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    /// Decimal value, preserving cents exactly.
    pub value: Decimal,
    /// ISO 4217 currency code (e.g. "USD").
    pub currency: String,
}

impl MonetaryAmount {
    /// Create an amount in an arbitrary currency.
    pub fn new(value: Decimal, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }

    /// Create a USD amount.
    pub fn usd(value: Decimal) -> Self {
        Self::new(value, "USD")
    }

    /// Project the decimal value onto `f64` for feature arithmetic.
    ///
    /// `Decimal` is always finite, so the projection never yields NaN or
    /// infinity; values beyond `f64` precision degrade gracefully.
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or(0.0)
    }

    /// Whether the amount is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.value.is_sign_negative() && !self.value.is_zero()
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }
}

impl std::fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_usd_constructor() {
        let amount = MonetaryAmount::usd(dec!(125.50));
        assert_eq!(amount.currency, "USD");
        assert_eq!(amount.to_f64(), 125.5);
    }

    #[test]
    fn test_negative_detection() {
        assert!(MonetaryAmount::usd(dec!(-0.01)).is_negative());
        assert!(!MonetaryAmount::usd(dec!(0)).is_negative());
        assert!(!MonetaryAmount::usd(dec!(10)).is_negative());
    }
}
