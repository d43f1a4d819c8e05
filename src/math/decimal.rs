//! Bridges between integer amounts and `rust_decimal` fractions.
//!
//! Large amounts never enter `Decimal` directly: ratios are formed with a
//! widened integer division at 18 decimal places first, and fractional
//! results are scaled back before being applied to an amount.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::mul_div;
use crate::domain::Rounding;
use crate::error::{LedgerError, Result};

/// Fixed-point scale used when moving between integers and decimals.
pub const SCALE: u128 = SCALE_U64 as u128;

const SCALE_U64: u64 = 1_000_000_000_000_000_000;

const SCALE_DIGITS: u32 = 18;

/// `numerator / denominator` as a decimal with 18 fractional digits.
///
/// # Errors
///
/// - [`LedgerError::DivisionByZero`] if `denominator` is zero.
/// - [`LedgerError::Overflow`] if the ratio exceeds the decimal range.
pub fn ratio(numerator: u128, denominator: u128, rounding: Rounding) -> Result<Decimal> {
    let scaled = mul_div(numerator, SCALE, denominator, rounding)?;
    let scaled = i128::try_from(scaled).map_err(|_| LedgerError::Overflow("ratio exceeds i128"))?;
    Decimal::try_from_i128_with_scale(scaled, SCALE_DIGITS)
        .map_err(|_| LedgerError::Overflow("ratio exceeds decimal range"))
}

/// Applies a non-negative decimal factor to `amount`.
///
/// # Errors
///
/// - [`LedgerError::Underflow`] if the factor is negative.
/// - [`LedgerError::Overflow`] if the scaled product exceeds `u128`.
pub fn apply_factor(amount: u128, factor: Decimal, rounding: Rounding) -> Result<u128> {
    if factor.is_sign_negative() {
        return Err(LedgerError::Underflow("negative factor"));
    }
    let scaled = factor
        .checked_mul(Decimal::from(SCALE_U64))
        .ok_or(LedgerError::Overflow("factor scaling"))?;
    let scaled = match rounding {
        Rounding::Down => scaled.floor(),
        Rounding::Up => scaled.ceil(),
    };
    let scaled = scaled
        .to_u128()
        .ok_or(LedgerError::Overflow("factor exceeds u128"))?;
    mul_div(amount, scaled, SCALE, rounding)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ratio_of_simple_values() {
        assert_eq!(ratio(1, 4, Rounding::Down), Ok(dec!(0.25)));
        assert_eq!(ratio(3, 2, Rounding::Down), Ok(dec!(1.5)));
    }

    #[test]
    fn ratio_of_huge_values_stays_in_range() {
        let Ok(r) = ratio(u128::MAX / 3, u128::MAX / 6, Rounding::Down) else {
            panic!("ratio fits");
        };
        assert_eq!(r.round_dp(6), dec!(2));
    }

    #[test]
    fn ratio_rounding_direction() {
        let Ok(down) = ratio(1, 3, Rounding::Down) else {
            panic!("ratio fits");
        };
        let Ok(up) = ratio(1, 3, Rounding::Up) else {
            panic!("ratio fits");
        };
        assert!(up > down);
    }

    #[test]
    fn apply_factor_scales_amount() {
        assert_eq!(
            apply_factor(1_000_000, dec!(0.5), Rounding::Down),
            Ok(500_000)
        );
        assert_eq!(apply_factor(3, dec!(0.5), Rounding::Up), Ok(2));
        assert!(apply_factor(3, dec!(-0.5), Rounding::Down).is_err());
    }
}
