//! Weighted constant-product curve: `Bᵢ^wᵢ · Bₒ^wₒ = k`.
//!
//! Equal weights take an exact integer path.  Unequal weights raise a
//! reserve ratio to `wᵢ / wₒ` with `rust_decimal`.
//!
//! ```text
//! out = Bₒ · (1 − (Bᵢ / (Bᵢ + a))^(wᵢ/wₒ))
//! in  = Bᵢ · ((Bₒ / (Bₒ − a))^(wₒ/wᵢ) − 1)
//! ```

use rust_decimal::{Decimal, MathematicalOps};

use super::decimal::{apply_factor, ratio};
use super::mul_div;
use crate::domain::{Permill, Rounding};
use crate::error::{LedgerError, Result};

fn exponent(numerator: Permill, denominator: Permill) -> Result<Decimal> {
    if numerator.is_zero() || denominator.is_zero() {
        return Err(LedgerError::InvalidConfiguration("weights must be non-zero"));
    }
    numerator
        .to_decimal()
        .checked_div(denominator.to_decimal())
        .ok_or(LedgerError::DivisionByZero)
}

fn pow(base: Decimal, exp: Decimal) -> Result<Decimal> {
    base.checked_powd(exp)
        .ok_or(LedgerError::Overflow("weighted power out of range"))
}

/// Amount released from the output reserve for `amount_in` entering the
/// input reserve.  Rounds down.
///
/// # Errors
///
/// - [`LedgerError::ZeroReserve`] if either reserve is zero.
/// - [`LedgerError::Overflow`] if intermediates leave their range.
pub fn out_given_in(
    reserve_in: u128,
    weight_in: Permill,
    reserve_out: u128,
    weight_out: Permill,
    amount_in: u128,
) -> Result<u128> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(LedgerError::ZeroReserve);
    }
    let grown = reserve_in
        .checked_add(amount_in)
        .ok_or(LedgerError::Overflow("input reserve"))?;
    if weight_in == weight_out {
        return mul_div(reserve_out, amount_in, grown, Rounding::Down);
    }
    let base = ratio(reserve_in, grown, Rounding::Up)?;
    let retained = pow(base, exponent(weight_in, weight_out)?)?;
    let factor = (Decimal::ONE - retained).max(Decimal::ZERO);
    apply_factor(reserve_out, factor, Rounding::Down)
}

/// Amount that must enter the input reserve to release `amount_out`.
/// Rounds up.
///
/// # Errors
///
/// - [`LedgerError::ZeroReserve`] if either reserve is zero.
/// - [`LedgerError::InsufficientLiquidity`] if `amount_out` would drain
///   the output reserve.
pub fn in_given_out(
    reserve_in: u128,
    weight_in: Permill,
    reserve_out: u128,
    weight_out: Permill,
    amount_out: u128,
) -> Result<u128> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(LedgerError::ZeroReserve);
    }
    if amount_out >= reserve_out {
        return Err(LedgerError::InsufficientLiquidity);
    }
    let shrunk = reserve_out - amount_out;
    if weight_in == weight_out {
        return mul_div(reserve_in, amount_out, shrunk, Rounding::Up);
    }
    let base = ratio(reserve_out, shrunk, Rounding::Up)?;
    let grown = pow(base, exponent(weight_out, weight_in)?)?;
    let factor = (grown - Decimal::ONE).max(Decimal::ZERO);
    apply_factor(reserve_in, factor, Rounding::Up)
}

/// Marginal price of the base asset in quote units:
/// `(B_quote / w_quote) / (B_base / w_base)`.
///
/// # Errors
///
/// - [`LedgerError::ZeroReserve`] if the base reserve is zero.
/// - [`LedgerError::Overflow`] if the price leaves the decimal range.
pub fn spot_price(
    base_reserve: u128,
    base_weight: Permill,
    quote_reserve: u128,
    quote_weight: Permill,
) -> Result<Decimal> {
    if base_reserve == 0 {
        return Err(LedgerError::ZeroReserve);
    }
    let reserves = ratio(quote_reserve, base_reserve, Rounding::Down)?;
    reserves
        .checked_mul(exponent(base_weight, quote_weight)?)
        .ok_or(LedgerError::Overflow("spot price out of range"))
}
