//! Construction of a pool from its configuration.
//!
//! Each pool kind implements `FromConfig<C>` for its own configuration
//! struct, so the [`PoolFactory`](crate::factory::PoolFactory) can build
//! any kind without trait objects:
//!
//! ```text
//! PoolConfig::ConstantProduct(cfg) => ConstantProductPool::from_config(&cfg, identity)
//! PoolConfig::StableSwap(cfg)      => StableSwapPool::from_config(&cfg, identity)
//! ```
//!
//! There is no blanket implementation; every pairing is explicit.

use crate::domain::{AccountId, AssetId};
use crate::error::Result;

/// Ownership and LP token assigned by the registry at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolIdentity {
    /// Pool owner.
    pub owner: AccountId,
    /// LP token minted by the pool.
    pub lp_token: AssetId,
}

/// Builds a pool from a configuration.
pub trait FromConfig<C> {
    /// Validates `config` and returns an empty pool.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfiguration`](crate::error::LedgerError::InvalidConfiguration)
    /// if any parameter is out of range.
    fn from_config(config: &C, identity: PoolIdentity) -> Result<Self>
    where
        Self: Sized;
}
