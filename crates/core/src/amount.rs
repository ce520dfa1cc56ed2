//! Amount - Strictly positive decimal wrapper for transfer amounts
//!
//! Every amount handed to the ledger MUST be greater than zero and must not
//! carry more decimal places than the ledger's minimum unit allows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Decimal places of the ledger's minimum unit (1 unit = 100 000 quarks).
pub const DEFAULT_PRECISION: u32 = 5;

/// Errors that can occur when constructing amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount must be greater than zero: {0}")]
    NotPositive(Decimal),

    #[error("Amount {value} exceeds ledger precision of {precision} decimal places")]
    TooPrecise { value: Decimal, precision: u32 },
}

/// A strictly positive decimal amount for ledger transfers.
///
/// # Invariant
/// The inner value is always > 0. This is enforced by the constructor.
///
/// # Example
/// ```
/// use relaypay_core::Amount;
/// use rust_decimal::Decimal;
///
/// let amount = Amount::new(Decimal::new(200, 0)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(200, 0));
///
/// // Zero and negative amounts are rejected
/// assert!(Amount::new(Decimal::ZERO).is_err());
/// assert!(Amount::new(Decimal::new(-5, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Create a new Amount from a Decimal.
    ///
    /// Returns an error if the value is zero or negative.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            Err(AmountError::NotPositive(value))
        } else {
            Ok(Self(value.normalize()))
        }
    }

    /// Create an Amount that also respects the ledger's minimum unit.
    pub fn with_precision(value: Decimal, precision: u32) -> Result<Self, AmountError> {
        let amount = Self::new(value)?;
        if amount.0.scale() > precision {
            return Err(AmountError::TooPrecise { value, precision });
        }
        Ok(amount)
    }

    /// Get the inner Decimal value
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }

    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
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

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(dec!(200)).unwrap();
        assert_eq!(amount.value(), dec!(200));
    }

    #[test]
    fn test_amount_zero_rejected() {
        let result = Amount::new(Decimal::ZERO);
        assert!(matches!(result, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_amount_negative_rejected() {
        let result = Amount::new(dec!(-1));
        assert!(matches!(result, Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_precision_bound() {
        assert!(Amount::with_precision(dec!(0.00001), 5).is_ok());
        assert!(matches!(
            Amount::with_precision(dec!(0.000001), 5),
            Err(AmountError::TooPrecise { precision: 5, .. })
        ));
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_precision() {
        let amount = Amount::with_precision(dec!(12.5000000), 5).unwrap();
        assert_eq!(amount.value(), dec!(12.5));
    }

    #[test]
    fn test_checked_add() {
        let a = Amount::new(dec!(200)).unwrap();
        let b = Amount::new(dec!(1.5)).unwrap();
        assert_eq!(a.checked_add(&b).unwrap().value(), dec!(201.5));
    }

    #[test]
    fn test_serde_rejects_zero() {
        let parsed: Result<Amount, _> = serde_json::from_str("\"0\"");
        assert!(parsed.is_err());

        let parsed: Amount = serde_json::from_str("\"123.45\"").unwrap();
        assert_eq!(parsed.value(), dec!(123.45));
    }
}
