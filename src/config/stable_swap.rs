//! Configuration for StableSwap pools.

use serde::{Deserialize, Serialize};

use crate::domain::{AssetPair, FeeConfig};
use crate::error::{LedgerError, Result};

/// Largest accepted amplification coefficient.
pub const MAX_AMPLIFICATION: u32 = 1_000_000;

/// Configuration for a StableSwap pool.
///
/// The amplification coefficient `A` flattens the curve around balance:
/// `A = 1` behaves close to constant product, large `A` approaches a
/// constant sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableSwapConfig {
    pair: AssetPair,
    fee_config: FeeConfig,
    amplification: u32,
}

impl StableSwapConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfiguration`] if `amplification` is
    /// zero or above [`MAX_AMPLIFICATION`].
    pub fn new(pair: AssetPair, fee_config: FeeConfig, amplification: u32) -> Result<Self> {
        let config = Self {
            pair,
            fee_config,
            amplification,
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
        if self.amplification == 0 {
            return Err(LedgerError::InvalidConfiguration(
                "amplification must be greater than zero",
            ));
        }
        if self.amplification > MAX_AMPLIFICATION {
            return Err(LedgerError::InvalidConfiguration(
                "amplification exceeds the supported maximum",
            ));
        }
        Ok(())
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

    /// Amplification coefficient `A`.
    #[must_use]
    pub const fn amplification(&self) -> u32 {
        self.amplification
    }
}
