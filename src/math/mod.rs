//! Arithmetic building blocks for pricing and accounting.
//!
//! - [`CheckedArithmetic`] lifts checked `Amount` operations into
//!   [`LedgerError`](crate::error::LedgerError) results.
//! - [`div_round`] and [`mul_div`] divide with an explicit rounding
//!   direction, the latter through a 256-bit intermediate.
//! - [`stable_swap`] and [`weighted`] hold the curve solvers used by the
//!   pool strategies.

mod checked;
pub mod decimal;
mod rounding;
pub mod stable_swap;
pub mod weighted;
mod wide;

pub use checked::CheckedArithmetic;
pub use rounding::div_round;
pub use wide::{mul_div, narrow, sqrt_product};
