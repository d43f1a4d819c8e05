//! Validated configuration for pools, reward pools and the ledger.
//!
//! [`PoolConfig`] is the blueprint for creating any pool kind, with one
//! configuration struct per kind.  [`RewardPoolConfig`] describes a staking
//! reward pool, and [`LedgerConfig`] carries deployment settings that can
//! be loaded from JSON.

mod constant_product;
mod ledger;
mod liquidity_bootstrapping;
mod pool_config;
mod reward_pool;
mod stable_swap;

pub use constant_product::ConstantProductConfig;
pub use ledger::LedgerConfig;
pub use liquidity_bootstrapping::LiquidityBootstrappingConfig;
pub use pool_config::{PoolConfig, PoolKind};
pub use reward_pool::{LockConfig, RewardConfig, RewardPoolConfig, RewardRate};
pub use stable_swap::{StableSwapConfig, MAX_AMPLIFICATION};
