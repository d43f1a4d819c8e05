//! 256-bit intermediates for products of two `u128` values.

use primitive_types::U256;

use crate::domain::Rounding;
use crate::error::{LedgerError, Result};

/// Narrows a 256-bit value back to `u128`.
///
/// # Errors
///
/// Returns [`LedgerError::Overflow`] with `context` if the value does not fit.
pub fn narrow(value: U256, context: &'static str) -> Result<u128> {
    if value > U256::from(u128::MAX) {
        return Err(LedgerError::Overflow(context));
    }
    Ok(value.low_u128())
}

/// Computes `a * b / c` without intermediate overflow.
///
/// # Errors
///
/// - [`LedgerError::DivisionByZero`] if `c` is zero.
/// - [`LedgerError::Overflow`] if the quotient exceeds `u128`.
///
/// # Examples
///
/// ```
/// use dex_ledger::domain::Rounding;
/// use dex_ledger::math::mul_div;
///
/// assert_eq!(mul_div(u128::MAX, 2, 4, Rounding::Down), Ok(u128::MAX / 2));
/// assert_eq!(mul_div(10, 1, 3, Rounding::Up), Ok(4));
/// ```
pub fn mul_div(a: u128, b: u128, c: u128, rounding: Rounding) -> Result<u128> {
    if c == 0 {
        return Err(LedgerError::DivisionByZero);
    }
    let product = U256::from(a) * U256::from(b);
    let (quotient, remainder) = product.div_mod(U256::from(c));
    let quotient = if rounding.is_up() && !remainder.is_zero() {
        quotient + U256::one()
    } else {
        quotient
    };
    narrow(quotient, "mul_div result exceeds u128")
}

/// Floor of `sqrt(a * b)`, the geometric mean used to size a first deposit.
#[must_use]
pub fn sqrt_product(a: u128, b: u128) -> u128 {
    // sqrt of a value below 2^256 is below 2^128, so the narrowing is exact.
    (U256::from(a) * U256::from(b)).integer_sqrt().low_u128()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_handles_wide_products() {
        let Ok(v) = mul_div(u128::MAX, u128::MAX, u128::MAX, Rounding::Down) else {
            panic!("fits after division");
        };
        assert_eq!(v, u128::MAX);
    }

    #[test]
    fn mul_div_rejects_oversized_quotient() {
        assert_eq!(
            mul_div(u128::MAX, 2, 1, Rounding::Down),
            Err(LedgerError::Overflow("mul_div result exceeds u128"))
        );
    }

    #[test]
    fn mul_div_rounds_up_only_with_remainder() {
        assert_eq!(mul_div(9, 2, 3, Rounding::Up), Ok(6));
        assert_eq!(mul_div(10, 2, 3, Rounding::Up), Ok(7));
        assert_eq!(mul_div(10, 2, 3, Rounding::Down), Ok(6));
    }

    #[test]
    fn mul_div_zero_divisor() {
        assert_eq!(
            mul_div(1, 1, 0, Rounding::Down),
            Err(LedgerError::DivisionByZero)
        );
    }

    #[test]
    fn sqrt_product_values() {
        assert_eq!(sqrt_product(0, 10), 0);
        assert_eq!(sqrt_product(4, 9), 6);
        assert_eq!(sqrt_product(10, 10), 10);
        assert_eq!(sqrt_product(2, 3), 2);
        assert_eq!(sqrt_product(u128::MAX, u128::MAX), u128::MAX);
    }
}
