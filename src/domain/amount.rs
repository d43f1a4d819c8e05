//! Raw asset amount with checked arithmetic.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Rounding;

/// An asset amount in the smallest unit.
///
/// Arithmetic methods are checked: they return `None` on overflow,
/// underflow, or division by zero instead of panicking.  The
/// [`CheckedArithmetic`](crate::math::CheckedArithmetic) trait lifts them
/// into [`LedgerError`](crate::error::LedgerError) results.
///
/// # Examples
///
/// ```
/// use dex_ledger::domain::{Amount, Rounding};
///
/// let a = Amount::new(100);
/// let b = Amount::new(200);
/// assert_eq!(a.checked_add(&b), Some(Amount::new(300)));
/// assert_eq!(b.checked_div(&Amount::new(3), Rounding::Up), Some(Amount::new(67)));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
#[must_use]
pub struct Amount(u128);

impl Amount {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Maximum representable amount.
    pub const MAX: Self = Self(u128::MAX);

    /// Creates a new `Amount` from a raw `u128` value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Returns the underlying `u128` value.
    #[must_use]
    pub const fn get(&self) -> u128 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(&self, other: &Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(&self, other: &Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked multiplication. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_mul(&self, other: &Self) -> Option<Self> {
        match self.0.checked_mul(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked division with explicit rounding direction.
    ///
    /// Returns `None` if `divisor` is zero.
    #[must_use]
    pub const fn checked_div(&self, divisor: &Self, rounding: Rounding) -> Option<Self> {
        match crate::math::div_round(self.0, divisor.0, rounding) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating addition, clamping at [`Amount::MAX`].
    pub const fn saturating_add(&self, other: &Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction, clamping at zero.
    pub const fn saturating_sub(&self, other: &Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn constants() {
        assert_eq!(Amount::ZERO.get(), 0);
        assert_eq!(Amount::MAX.get(), u128::MAX);
        assert_eq!(Amount::default(), Amount::ZERO);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Amount::new(1_000_000)), "1000000");
    }

    #[test]
    fn add_overflow() {
        assert_eq!(Amount::MAX.checked_add(&Amount::new(1)), None);
    }

    #[test]
    fn sub_underflow() {
        assert_eq!(Amount::new(1).checked_sub(&Amount::new(2)), None);
    }

    #[test]
    fn mul_overflow() {
        assert_eq!(Amount::MAX.checked_mul(&Amount::new(2)), None);
    }

    #[test]
    fn div_rounding_directions() {
        let a = Amount::new(10);
        let b = Amount::new(3);
        assert_eq!(a.checked_div(&b, Rounding::Down), Some(Amount::new(3)));
        assert_eq!(a.checked_div(&b, Rounding::Up), Some(Amount::new(4)));
        assert_eq!(a.checked_div(&Amount::ZERO, Rounding::Down), None);
    }

    #[test]
    fn saturating_ops_clamp() {
        assert_eq!(Amount::MAX.saturating_add(&Amount::new(5)), Amount::MAX);
        assert_eq!(Amount::new(1).saturating_sub(&Amount::new(5)), Amount::ZERO);
    }

    #[test]
    fn serializes_as_plain_number() {
        let Ok(json) = serde_json::to_string(&Amount::new(42)) else {
            panic!("serializable");
        };
        assert_eq!(json, "42");
    }
}
