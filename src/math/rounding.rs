//! Integer division with an explicit rounding direction.
//!
//! Amounts paid out round down and amounts charged round up, so the pool
//! never gives away value to rounding.
//!
//! ```
//! use dex_ledger::domain::Rounding;
//! use dex_ledger::math::div_round;
//!
//! assert_eq!(div_round(10, 3, Rounding::Down), Some(3));
//! assert_eq!(div_round(10, 3, Rounding::Up), Some(4));
//! assert_eq!(div_round(10, 0, Rounding::Down), None);
//! ```

use crate::domain::Rounding;

/// Divides `numerator` by `denominator`, rounding as requested.
///
/// Returns [`None`] if `denominator` is zero.
#[must_use]
pub const fn div_round(numerator: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    let quotient = numerator / denominator;
    match rounding {
        Rounding::Down => Some(quotient),
        Rounding::Up => {
            // quotient + 1 cannot overflow: a non-zero remainder implies
            // quotient < u128::MAX.
            if numerator % denominator != 0 {
                Some(quotient + 1)
            } else {
                Some(quotient)
            }
        }
    }
}
