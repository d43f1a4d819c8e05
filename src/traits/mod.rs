//! Trait seams of the ledger.
//!
//! Pool kinds implement [`SwapPool`], [`LiquidityPool`] and
//! [`FromConfig`].  The embedding runtime supplies [`Assets`], [`Clock`]
//! and [`Authority`]; in-memory versions live in [`crate::env`].

mod assets;
mod authority;
mod clock;
mod from_config;
mod liquidity_pool;
mod swap_pool;

pub use assets::{deposit, withdraw, Assets, Settlement};
pub use authority::{Action, Authority};
pub use clock::Clock;
pub use from_config::{FromConfig, PoolIdentity};
pub use liquidity_pool::LiquidityPool;
pub use swap_pool::SwapPool;
