//! Checked arithmetic that reports [`LedgerError`] variants.
//!
//! ```
//! use dex_ledger::domain::Amount;
//! use dex_ledger::math::CheckedArithmetic;
//!
//! let sum = Amount::new(100).safe_add(&Amount::new(200));
//! assert_eq!(sum, Ok(Amount::new(300)));
//! ```

use crate::domain::{Amount, Rounding};
use crate::error::LedgerError;

/// Fallible arithmetic for domain wrapper types.
///
/// Every method returns a distinct error variant so callers can tell
/// overflow from underflow from division by zero.  Nothing saturates.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the result does not fit.
    fn safe_add(&self, other: &Self) -> Result<Self, LedgerError>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Underflow`] if the result would be negative.
    fn safe_sub(&self, other: &Self) -> Result<Self, LedgerError>;

    /// Checked multiplication.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the result does not fit.
    fn safe_mul(&self, other: &Self) -> Result<Self, LedgerError>;

    /// Checked division with explicit [`Rounding`] direction.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DivisionByZero`] if `other` is zero.
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self, LedgerError>;
}

impl CheckedArithmetic for Amount {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, LedgerError> {
        self.checked_add(other)
            .ok_or(LedgerError::Overflow("amount addition overflow"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, LedgerError> {
        self.checked_sub(other)
            .ok_or(LedgerError::Underflow("amount subtraction underflow"))
    }

    #[inline]
    fn safe_mul(&self, other: &Self) -> Result<Self, LedgerError> {
        self.checked_mul(other)
            .ok_or(LedgerError::Overflow("amount multiplication overflow"))
    }

    #[inline]
    fn safe_div(&self, other: &Self, rounding: Rounding) -> Result<Self, LedgerError> {
        self.checked_div(other, rounding)
            .ok_or(LedgerError::DivisionByZero)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn add_overflow_reports_overflow() {
        let Err(LedgerError::Overflow(_)) = Amount::MAX.safe_add(&Amount::new(1)) else {
            panic!("expected Overflow");
        };
    }

    #[test]
    fn sub_underflow_reports_underflow() {
        let Err(LedgerError::Underflow(_)) = Amount::new(1).safe_sub(&Amount::new(2)) else {
            panic!("expected Underflow");
        };
    }

    #[test]
    fn mul_ok_and_overflow() {
        assert_eq!(
            Amount::new(7).safe_mul(&Amount::new(6)),
            Ok(Amount::new(42))
        );
        assert!(Amount::MAX.safe_mul(&Amount::new(2)).is_err());
    }

    #[test]
    fn div_by_zero() {
        assert_eq!(
            Amount::new(7).safe_div(&Amount::ZERO, Rounding::Down),
            Err(LedgerError::DivisionByZero)
        );
        assert_eq!(
            Amount::new(7).safe_div(&Amount::new(2), Rounding::Up),
            Ok(Amount::new(4))
        );
    }
}
