//! Top-level pool configuration enum.
//!
//! [`PoolConfig`] is the declarative blueprint passed to
//! [`PoolRegistry::create_pool`](crate::registry::PoolRegistry::create_pool).
//! The factory matches on it to build the right strategy:
//!
//! ```text
//! match config {
//!     PoolConfig::ConstantProduct(cfg)        => ConstantProductPool::from_config(..),
//!     PoolConfig::StableSwap(cfg)             => StableSwapPool::from_config(..),
//!     PoolConfig::LiquidityBootstrapping(cfg) => LiquidityBootstrappingPool::from_config(..),
//! }
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{ConstantProductConfig, LiquidityBootstrappingConfig, StableSwapConfig};
use crate::domain::{AssetPair, FeeConfig};
use crate::error::Result;

/// Pool family tag, carried by events and read models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    /// Weighted constant product.
    ConstantProduct,
    /// StableSwap.
    StableSwap,
    /// Liquidity bootstrapping.
    LiquidityBootstrapping,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstantProduct => write!(f, "ConstantProduct"),
            Self::StableSwap => write!(f, "StableSwap"),
            Self::LiquidityBootstrapping => write!(f, "LiquidityBootstrapping"),
        }
    }
}

/// Configuration for any supported pool kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolConfig {
    /// Weighted constant-product pool.
    ConstantProduct(ConstantProductConfig),
    /// StableSwap pool.
    StableSwap(StableSwapConfig),
    /// Liquidity bootstrapping pool.
    LiquidityBootstrapping(LiquidityBootstrappingConfig),
}

impl PoolConfig {
    /// Validates the inner configuration.
    ///
    /// # Errors
    ///
    /// Returns the error of the variant's own `validate()`.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::ConstantProduct(cfg) => cfg.validate(),
            Self::StableSwap(cfg) => cfg.validate(),
            Self::LiquidityBootstrapping(cfg) => cfg.validate(),
        }
    }

    /// Pool family.
    #[must_use]
    pub const fn kind(&self) -> PoolKind {
        match self {
            Self::ConstantProduct(_) => PoolKind::ConstantProduct,
            Self::StableSwap(_) => PoolKind::StableSwap,
            Self::LiquidityBootstrapping(_) => PoolKind::LiquidityBootstrapping,
        }
    }

    /// Asset pair.
    #[must_use]
    pub const fn pair(&self) -> AssetPair {
        match self {
            Self::ConstantProduct(cfg) => cfg.pair(),
            Self::StableSwap(cfg) => cfg.pair(),
            Self::LiquidityBootstrapping(cfg) => cfg.pair(),
        }
    }

    /// Fee configuration.
    #[must_use]
    pub const fn fee_config(&self) -> FeeConfig {
        match self {
            Self::ConstantProduct(cfg) => cfg.fee_config(),
            Self::StableSwap(cfg) => cfg.fee_config(),
            Self::LiquidityBootstrapping(cfg) => cfg.fee_config(),
        }
    }

    /// Returns `true` if creating this pool always needs a privileged caller.
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        matches!(self, Self::LiquidityBootstrapping(_))
    }
}

impl fmt::Display for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.pair())
    }
}
