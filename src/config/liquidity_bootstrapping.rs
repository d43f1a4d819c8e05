//! Configuration for liquidity bootstrapping pools.

use serde::{Deserialize, Serialize};

use crate::domain::{AssetPair, FeeConfig, Sale};
use crate::error::Result;

/// Configuration for a liquidity bootstrapping pool.
///
/// The base asset is the one being distributed; its weight follows the
/// [`Sale`] schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityBootstrappingConfig {
    pair: AssetPair,
    fee_config: FeeConfig,
    sale: Sale,
}

impl LiquidityBootstrappingConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfiguration`](crate::error::LedgerError::InvalidConfiguration)
    /// if the sale schedule is invalid.
    pub fn new(pair: AssetPair, fee_config: FeeConfig, sale: Sale) -> Result<Self> {
        let config = Self {
            pair,
            fee_config,
            sale,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn validate(&self) -> Result<()> {
        self.sale.validate()
    }

    /// Asset pair.
    #[must_use]
    pub const fn pair(&self) -> AssetPair {
        self.pair
    }

    /// Fee configuration.
    #[must_use]
    pub const fn fee_config(&self) -> FeeConfig {
        self.fee_config
    }

    /// Sale schedule.
    #[must_use]
    pub const fn sale(&self) -> Sale {
        self.sale
    }
}
