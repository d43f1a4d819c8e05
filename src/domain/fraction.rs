//! Parts-per-million and parts-per-billion fractions.
//!
//! Pool fees and weights are [`Permill`]; staking reward multipliers and
//! unlock penalties are [`Perbill`].  Both store an integer numerator over a
//! fixed denominator and are always within `[0, 1]`.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Amount, Rounding};
use crate::error::{LedgerError, Result};
use crate::math::mul_div;

macro_rules! fraction {
    ($(#[$meta:meta])* $name:ident, $denominator:expr, $scale:expr, $unit:expr) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize,
            Deserialize,
        )]
        #[serde(try_from = "u32", into = "u32")]
        pub struct $name(u32);

        impl $name {
            /// Denominator representing 100%.
            pub const DENOMINATOR: u32 = $denominator;

            /// 0%.
            pub const ZERO: Self = Self(0);

            /// 100%.
            pub const ONE: Self = Self($denominator);

            /// Creates a fraction from raw parts.
            ///
            /// # Errors
            ///
            /// Returns [`LedgerError::InvalidConfiguration`] if `parts`
            /// exceeds the denominator.
            pub const fn new(parts: u32) -> Result<Self> {
                if parts > $denominator {
                    return Err(LedgerError::InvalidConfiguration(concat!(
                        stringify!($name),
                        " exceeds 100%"
                    )));
                }
                Ok(Self(parts))
            }

            /// Creates a fraction from a whole percentage, clamped to 100%.
            #[must_use]
            pub const fn from_percent(percent: u32) -> Self {
                if percent >= 100 {
                    return Self::ONE;
                }
                Self(percent * ($denominator / 100))
            }

            /// Returns the raw numerator.
            #[must_use]
            pub const fn parts(&self) -> u32 {
                self.0
            }

            /// Returns `true` for 0%.
            #[must_use]
            pub const fn is_zero(&self) -> bool {
                self.0 == 0
            }

            /// Returns `true` for 100%.
            #[must_use]
            pub const fn is_one(&self) -> bool {
                self.0 == $denominator
            }

            /// Returns `100% - self`.
            #[must_use]
            pub const fn complement(&self) -> Self {
                Self($denominator - self.0)
            }

            /// Applies the fraction to `amount`, rounding down.
            ///
            /// # Errors
            ///
            /// Never fails for valid fractions; the error path exists for
            /// the widened multiply-divide.
            pub fn mul_floor(&self, amount: Amount) -> Result<Amount> {
                self.apply(amount, Rounding::Down)
            }

            /// Applies the fraction to `amount`, rounding up.
            ///
            /// # Errors
            ///
            /// Same as [`Self::mul_floor`].
            pub fn mul_ceil(&self, amount: Amount) -> Result<Amount> {
                self.apply(amount, Rounding::Up)
            }

            fn apply(&self, amount: Amount, rounding: Rounding) -> Result<Amount> {
                mul_div(
                    amount.get(),
                    u128::from(self.0),
                    u128::from(Self::DENOMINATOR),
                    rounding,
                )
                .map(Amount::new)
            }

            /// Exact decimal value in `[0, 1]`.
            #[must_use]
            pub fn to_decimal(&self) -> Decimal {
                Decimal::new(i64::from(self.0), $scale)
            }
        }

        impl TryFrom<u32> for $name {
            type Error = LedgerError;

            fn try_from(parts: u32) -> Result<Self> {
                Self::new(parts)
            }
        }

        impl From<$name> for u32 {
            fn from(value: $name) -> u32 {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", self.0, $unit)
            }
        }
    };
}

fraction!(
    /// A fraction with denominator 1 000 000 (parts per million).
    ///
    /// ```
    /// use dex_ledger::domain::{Amount, Permill};
    ///
    /// let fee = Permill::new(150_000).expect("15%");
    /// assert_eq!(fee.mul_floor(Amount::new(1_000)).expect("fits"), Amount::new(150));
    /// ```
    Permill,
    1_000_000,
    6,
    "ppm"
);

fraction!(
    /// A fraction with denominator 1 000 000 000 (parts per billion).
    Perbill,
    1_000_000_000,
    9,
    "ppb"
);
