//! StableSwap invariant solvers for two-asset pools.
//!
//! For `n = 2` with `Ann = A * n` the invariant is
//!
//! ```text
//! Ann · (x + y) + D = Ann · D + D³ / (4 · x · y)
//! ```
//!
//! Both `D` and the unknown balance are found by Newton iteration.  The
//! result is an approximation: iteration stops once two consecutive
//! iterates differ by at most [`CONVERGENCE_THRESHOLD`], or fails after
//! [`MAX_ITERATIONS`] steps.  Intermediates are 256-bit.

use primitive_types::U256;
use rust_decimal::Decimal;

use super::decimal::ratio;
use super::wide::narrow;
use crate::domain::Rounding;
use crate::error::{LedgerError, Result};

/// Number of assets in a pool.
const N: u64 = 2;

/// Iteration bound for both solvers.
pub const MAX_ITERATIONS: u32 = 255;

/// Largest accepted distance between consecutive iterates.
pub const CONVERGENCE_THRESHOLD: u64 = 1;

fn ann(amplification: u128) -> Result<U256> {
    if amplification == 0 {
        return Err(LedgerError::InvalidConfiguration(
            "amplification must be greater than zero",
        ));
    }
    mul(U256::from(amplification), U256::from(N))
}

fn mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b)
        .ok_or(LedgerError::Overflow("stable swap intermediate exceeds 256 bits"))
}

fn add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b)
        .ok_or(LedgerError::Overflow("stable swap intermediate exceeds 256 bits"))
}

fn converged(a: U256, b: U256) -> bool {
    let diff = if a > b { a - b } else { b - a };
    diff <= U256::from(CONVERGENCE_THRESHOLD)
}

/// Computes the invariant `D` for reserves `x` and `y`.
///
/// Iterates `D' = (Ann·S + n·D_P) · D / ((Ann − 1)·D + (n + 1)·D_P)` with
/// `D_P = D³ / (4xy)`, starting from `D = x + y`.
///
/// # Errors
///
/// - [`LedgerError::ZeroReserve`] if exactly one reserve is zero.
/// - [`LedgerError::NewtonRaphsonNonConvergence`] if the bound is hit.
/// - [`LedgerError::Overflow`] if `D` exceeds `u128` or an intermediate
///   exceeds 256 bits, as happens for extremely imbalanced reserves.
pub fn compute_d(x: u128, y: u128, amplification: u128) -> Result<u128> {
    if x == 0 && y == 0 {
        return Ok(0);
    }
    if x == 0 || y == 0 {
        return Err(LedgerError::ZeroReserve);
    }
    let ann = ann(amplification)?;
    let n = U256::from(N);
    let (x, y) = (U256::from(x), U256::from(y));
    let s = add(x, y)?;
    let (nx, ny) = (mul(n, x)?, mul(n, y)?);
    let mut d = s;
    for _ in 0..MAX_ITERATIONS {
        let d_p = mul(mul(d, d)? / nx, d)? / ny;
        let previous = d;
        let numerator = mul(add(mul(ann, s)?, mul(n, d_p)?)?, d)?;
        let denominator = add(mul(ann - U256::one(), d)?, mul(n + U256::one(), d_p)?)?;
        if denominator.is_zero() {
            return Err(LedgerError::DivisionByZero);
        }
        d = numerator / denominator;
        if converged(d, previous) {
            return narrow(d, "stable swap invariant exceeds u128");
        }
    }
    Err(LedgerError::NewtonRaphsonNonConvergence(
        "invariant D did not converge",
    ))
}

/// Computes the balance of the opposite asset that keeps `D` constant when
/// this asset's balance becomes `x`.
///
/// Solves `y² + (b − D)·y = c` with `b = x + D/Ann` and
/// `c = D³ / (4·x·Ann)` via `y' = (y² + c) / (2y + b − D)`, starting from
/// `y = D`.
///
/// # Errors
///
/// - [`LedgerError::ZeroReserve`] if `x` is zero.
/// - [`LedgerError::NewtonRaphsonNonConvergence`] if the bound is hit.
/// - [`LedgerError::Overflow`] if an intermediate exceeds 256 bits.
pub fn compute_y(x: u128, d: u128, amplification: u128) -> Result<u128> {
    if x == 0 {
        return Err(LedgerError::ZeroReserve);
    }
    let ann = ann(amplification)?;
    let n = U256::from(N);
    let (x, d) = (U256::from(x), U256::from(d));
    let c = mul(mul(d, d)? / mul(n, x)?, d)? / mul(n, ann)?;
    let b = add(x, d / ann)?;
    let mut y = d;
    for _ in 0..MAX_ITERATIONS {
        let previous = y;
        let span = add(add(y, y)?, b)?;
        if span <= d {
            return Err(LedgerError::NewtonRaphsonNonConvergence(
                "balance iteration left the positive domain",
            ));
        }
        y = add(mul(y, y)?, c)? / (span - d);
        if converged(y, previous) {
            return narrow(y, "stable swap balance exceeds u128");
        }
    }
    Err(LedgerError::NewtonRaphsonNonConvergence(
        "balance did not converge",
    ))
}

/// Marginal price of `x` in units of `y`, the ratio of the invariant's
/// partial derivatives.
///
/// With `a = x/D` and `b = y/D` this is
/// `(4·Ann·a²·b² + b) / (4·Ann·a²·b² + a)`.
///
/// # Errors
///
/// - [`LedgerError::ZeroReserve`] if either balance is zero.
/// - Errors from [`compute_d`].
pub fn spot_price(x: u128, y: u128, amplification: u128) -> Result<Decimal> {
    if x == 0 || y == 0 {
        return Err(LedgerError::ZeroReserve);
    }
    let d = compute_d(x, y, amplification)?;
    let a = ratio(x, d, Rounding::Down)?;
    let b = ratio(y, d, Rounding::Down)?;
    let four_ann = i128::try_from(amplification)
        .ok()
        .and_then(|amp| Decimal::try_from_i128_with_scale(amp, 0).ok())
        .and_then(|amp| amp.checked_mul(Decimal::from(4 * N)))
        .ok_or(LedgerError::Overflow("amplification out of decimal range"))?;
    let coupling = a
        .checked_mul(a)
        .and_then(|v| v.checked_mul(b))
        .and_then(|v| v.checked_mul(b))
        .and_then(|v| v.checked_mul(four_ann))
        .ok_or(LedgerError::Overflow("spot price coupling term"))?;
    (coupling + b)
        .checked_div(coupling + a)
        .ok_or(LedgerError::DivisionByZero)
}
