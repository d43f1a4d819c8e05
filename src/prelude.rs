//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use dex_ledger::prelude::*;
//! ```

pub use crate::domain::{
    AccountId, Amount, AssetId, AssetPair, BlockNumber, Fee, FeeConfig, Moment, Perbill, Permill,
    PoolId, PositionId, Rounding, Sale, SwapOutcome,
};

pub use crate::traits::{Assets, Authority, Clock, FromConfig, LiquidityPool, SwapPool};

pub use crate::math::CheckedArithmetic;

pub use crate::config::{
    ConstantProductConfig, LedgerConfig, LiquidityBootstrappingConfig, LockConfig, PoolConfig,
    RewardConfig, RewardPoolConfig, RewardRate, StableSwapConfig,
};

pub use crate::error::{LedgerError, Result};

pub use crate::events::{Event, Receipt};

pub use crate::factory::PoolFactory;

pub use crate::pools::Pool;

pub use crate::env::{InMemoryAssets, ManualClock, PolicyAuthority};

pub use crate::ledger::Ledger;
