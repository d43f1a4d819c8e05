//! Pool implementations and the [`Pool`] dispatch enum.
//!
//! # Pool Kinds
//!
//! | Kind | Pool | Curve |
//! |------|------|-------|
//! | Constant product | [`ConstantProductPool`] | weighted `x^w · y^(1−w) = k` |
//! | StableSwap | [`StableSwapPool`] | amplified invariant `D` |
//! | Liquidity bootstrapping | [`LiquidityBootstrappingPool`] | weighted, weight follows the sale |

pub mod constant_product;
pub mod liquidity_bootstrapping;
pub mod stable_swap;

mod pool;
mod state;

#[cfg(test)]
mod proptest_properties;

pub use constant_product::ConstantProductPool;
pub use liquidity_bootstrapping::LiquidityBootstrappingPool;
pub use pool::Pool;
pub use stable_swap::StableSwapPool;
pub use state::PoolState;
