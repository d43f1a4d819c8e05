//! Explicit rounding direction for integer division.

use serde::{Deserialize, Serialize};

/// Rounding direction for division and widened multiply-divide.
///
/// Output amounts round [`Rounding::Down`], amounts the caller must pay
/// round [`Rounding::Up`].
///
/// # Examples
///
/// ```
/// use dex_ledger::domain::Rounding;
///
/// assert!(Rounding::Up.is_up());
/// assert!(Rounding::Down.is_down());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns `true` if this is [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }
}
