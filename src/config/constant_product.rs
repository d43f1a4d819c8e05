//! Configuration for weighted constant-product pools.

use serde::{Deserialize, Serialize};

use crate::domain::{AssetPair, FeeConfig, Permill};
use crate::error::{LedgerError, Result};

/// Configuration for a constant-product pool with base/quote weights.
///
/// `base_weight` is the base asset's share of the invariant; the quote
/// weight is its complement.  A 50% base weight gives the classic `x · y = k`.
///
/// # Validation
///
/// - `base_weight` lies strictly between 0% and 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantProductConfig {
    pair: AssetPair,
    fee_config: FeeConfig,
    base_weight: Permill,
}

impl ConstantProductConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfiguration`] if a weight is 0% or
    /// 100%.
    pub fn new(pair: AssetPair, fee_config: FeeConfig, base_weight: Permill) -> Result<Self> {
        let config = Self {
            pair,
            fee_config,
            base_weight,
        };
        config.validate()?;
        Ok(config)
    }

    /// Convenience constructor for an evenly weighted pool.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn balanced(pair: AssetPair, fee_config: FeeConfig) -> Result<Self> {
        Self::new(pair, fee_config, Permill::from_percent(50))
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn validate(&self) -> Result<()> {
        if self.base_weight.is_zero() || self.base_weight.is_one() {
            return Err(LedgerError::InvalidConfiguration(
                "base weight must lie strictly between 0% and 100%",
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

    /// Base asset weight.
    #[must_use]
    pub const fn base_weight(&self) -> Permill {
        self.base_weight
    }

    /// Quote asset weight, `100% − base_weight`.
    #[must_use]
    pub const fn quote_weight(&self) -> Permill {
        self.base_weight.complement()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::AssetId;

    fn pair() -> AssetPair {
        let Ok(p) = AssetPair::new(AssetId::new(1), AssetId::new(2)) else {
            panic!("distinct assets");
        };
        p
    }

    #[test]
    fn balanced_config_has_equal_weights() {
        let Ok(cfg) = ConstantProductConfig::balanced(pair(), FeeConfig::ZERO) else {
            panic!("valid config");
        };
        assert_eq!(cfg.base_weight(), cfg.quote_weight());
    }

    #[test]
    fn weights_complement() {
        let Ok(w) = Permill::new(800_000) else {
            panic!("valid weight");
        };
        let Ok(cfg) = ConstantProductConfig::new(pair(), FeeConfig::ZERO, w) else {
            panic!("valid config");
        };
        assert_eq!(cfg.quote_weight().parts(), 200_000);
    }

    #[test]
    fn degenerate_weights_rejected() {
        assert!(ConstantProductConfig::new(pair(), FeeConfig::ZERO, Permill::ZERO).is_err());
        assert!(ConstantProductConfig::new(pair(), FeeConfig::ZERO, Permill::ONE).is_err());
    }

    #[test]
    fn full_fee_accepted() {
        let fee = FeeConfig {
            fee_rate: Permill::ONE,
            ..FeeConfig::ZERO
        };
        assert!(ConstantProductConfig::balanced(pair(), fee).is_ok());
    }
}
