//! Amount - Non-negative decimal wrapper for grant money
//!
//! Budgets, line-item ceilings and spending requests are all compared with
//! exact decimal precision; floating point never enters the picture.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when constructing an amount
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative decimal amount of grant money.
///
/// # Invariant
/// The inner value is always >= 0, enforced by the constructor. Running
/// totals start at [`Amount::ZERO`]; operations that additionally require a
/// strictly positive amount check [`Amount::is_zero`] at their boundary.
///
/// # Example
/// ```
/// use grantflow_core::Amount;
/// use rust_decimal::Decimal;
///
/// let budget = Amount::new(Decimal::new(10_000, 0)).unwrap();
/// assert!(!budget.is_zero());
///
/// assert!(Amount::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Zero amount constant
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Amount from a Decimal.
    ///
    /// Returns an error if the value is negative.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            Err(AmountError::Negative(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Create an Amount without validation.
    ///
    /// # Safety
    /// The caller MUST ensure the value is non-negative. Use only for
    /// trusted sources (e.g. rows read back from a validated store).
    #[inline]
    pub const fn new_unchecked(value: Decimal) -> Self {
        Self(value)
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Check if the amount is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checked addition - None on overflow
    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction - None if the result would be negative
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        let result = self.0.checked_sub(other.0)?;
        if result < Decimal::ZERO {
            None
        } else {
            Some(Amount(result))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn positive_amount_accepted() {
        let amount = Amount::new(dec!(4000)).unwrap();
        assert_eq!(amount.value(), dec!(4000));
    }

    #[test]
    fn zero_amount_accepted() {
        let amount = Amount::new(Decimal::ZERO).unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn negative_amount_rejected() {
        let result = Amount::new(dec!(-100));
        assert!(matches!(result, Err(AmountError::Negative(_))));
    }

    #[test]
    fn checked_sub_prevents_negative() {
        let a = Amount::new(dec!(50)).unwrap();
        let b = Amount::new(dec!(100)).unwrap();
        assert!(a.checked_sub(&b).is_none());
    }

    #[test]
    fn running_total_accumulates_exactly() {
        let total = Amount::ZERO
            .checked_add(&Amount::new(dec!(4000)).unwrap())
            .and_then(|t| t.checked_add(&Amount::new(dec!(6000.01)).unwrap()))
            .unwrap();
        assert_eq!(total.value(), dec!(10000.01));
    }

    #[test]
    fn serde_roundtrip() {
        let amount = Amount::new(dec!(123.45)).unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        let parsed: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount, parsed);
    }

    #[test]
    fn serde_rejects_negative() {
        let result: Result<Amount, _> = serde_json::from_str("\"-5\"");
        assert!(result.is_err());
    }
}
