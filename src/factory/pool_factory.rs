//! Pool factory.

use crate::config::PoolConfig;
use crate::error::Result;
use crate::pools::{ConstantProductPool, LiquidityBootstrappingPool, Pool, StableSwapPool};
use crate::traits::{FromConfig, PoolIdentity};

/// Stateless factory for creating pools from configuration.
///
/// `PoolFactory` matches on the [`PoolConfig`] variant, validates the
/// configuration, delegates to the pool's [`FromConfig`] implementation
/// and wraps the result in a [`Pool`].
///
/// # Example
///
/// ```rust
/// use dex_ledger::config::{PoolConfig, StableSwapConfig};
/// use dex_ledger::domain::{AccountId, AssetId, AssetPair, FeeConfig};
/// use dex_ledger::factory::PoolFactory;
/// use dex_ledger::traits::{PoolIdentity, SwapPool};
///
/// let pair = AssetPair::new(AssetId::new(1), AssetId::new(2)).expect("distinct");
/// let cfg = StableSwapConfig::new(pair, FeeConfig::ZERO, 100).expect("valid");
/// let identity = PoolIdentity { owner: AccountId::from_bytes([1; 32]), lp_token: AssetId::new(7) };
///
/// let pool = PoolFactory::create(&PoolConfig::StableSwap(cfg), identity).expect("pool created");
/// assert_eq!(pool.pair(), pair);
/// assert_eq!(pool.lp_token(), AssetId::new(7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolFactory;

impl PoolFactory {
    /// Creates an empty pool from `config`.
    ///
    /// # Flow
    ///
    /// 1. Validate the configuration via [`PoolConfig::validate`].
    /// 2. Match on the config variant.
    /// 3. Delegate to the pool's [`FromConfig`] implementation.
    /// 4. Wrap the constructed pool in the corresponding [`Pool`] variant.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidConfiguration`](crate::error::LedgerError::InvalidConfiguration)
    ///   if the configuration is invalid.
    /// - Any error propagated from the pool's `from_config`.
    pub fn create(config: &PoolConfig, identity: PoolIdentity) -> Result<Pool> {
        config.validate()?;
        match config {
            PoolConfig::ConstantProduct(cfg) => Ok(Pool::ConstantProduct(
                ConstantProductPool::from_config(cfg, identity)?,
            )),
            PoolConfig::StableSwap(cfg) => Ok(Pool::StableSwap(StableSwapPool::from_config(
                cfg, identity,
            )?)),
            PoolConfig::LiquidityBootstrapping(cfg) => Ok(Pool::LiquidityBootstrapping(
                LiquidityBootstrappingPool::from_config(cfg, identity)?,
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::{ConstantProductConfig, LiquidityBootstrappingConfig, PoolKind};
    use crate::domain::{AccountId, AssetId, AssetPair, FeeConfig, Permill, Sale};
    use crate::traits::SwapPool;

    fn pair() -> AssetPair {
        let Ok(p) = AssetPair::new(AssetId::new(1), AssetId::new(2)) else {
            panic!("distinct assets");
        };
        p
    }

    fn identity() -> PoolIdentity {
        PoolIdentity {
            owner: AccountId::from_bytes([3; 32]),
            lp_token: AssetId::new(50),
        }
    }

    #[test]
    fn constant_product_via_factory() {
        let Ok(cfg) = ConstantProductConfig::balanced(pair(), FeeConfig::ZERO) else {
            panic!("valid config");
        };
        let Ok(pool) = PoolFactory::create(&PoolConfig::ConstantProduct(cfg), identity()) else {
            panic!("pool created");
        };
        assert_eq!(pool.kind(), PoolKind::ConstantProduct);
        assert_eq!(pool.owner(), &AccountId::from_bytes([3; 32]));
        assert!(pool.state().is_empty());
    }

    #[test]
    fn liquidity_bootstrapping_via_factory() {
        let (Ok(hi), Ok(lo)) = (Permill::new(800_000), Permill::new(200_000)) else {
            panic!("valid weights");
        };
        let Ok(sale) = Sale::new(1, 2, hi, lo) else {
            panic!("valid sale");
        };
        let Ok(cfg) = LiquidityBootstrappingConfig::new(pair(), FeeConfig::ZERO, sale) else {
            panic!("valid config");
        };
        let Ok(pool) =
            PoolFactory::create(&PoolConfig::LiquidityBootstrapping(cfg), identity())
        else {
            panic!("pool created");
        };
        assert_eq!(pool.kind(), PoolKind::LiquidityBootstrapping);
    }
}
