//! Ledger-wide settings loadable from JSON.

use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, Amount, AssetId};
use crate::error::{LedgerError, Result};

/// Deployment settings for a [`Ledger`](crate::ledger::Ledger).
///
/// Every field has a default, so a JSON document only needs the keys it
/// overrides:
///
/// ```
/// use dex_ledger::config::LedgerConfig;
///
/// let cfg = LedgerConfig::from_json(r#"{ "restrict_pool_creation": true }"#)
///     .expect("valid document");
/// assert!(cfg.restrict_pool_creation);
/// assert_eq!(cfg.block_time_ms, 6_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// When set, every pool creation needs a privileged caller.
    pub restrict_pool_creation: bool,
    /// Accounts holding the privileged role.
    pub managers: Vec<AccountId>,
    /// Receiver of protocol fees and unstaking penalties.
    pub treasury: AccountId,
    /// Minimum balance an account must keep once funded.
    pub existential_deposit: Amount,
    /// Milliseconds per block for the in-memory clock.
    pub block_time_ms: u64,
    /// First asset id handed out to LP tokens.
    pub first_lp_token_id: AssetId,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            restrict_pool_creation: false,
            managers: Vec::new(),
            treasury: AccountId::derive(*b"trsy", 0),
            existential_deposit: Amount::new(1),
            block_time_ms: 6_000,
            first_lp_token_id: AssetId::new(1_000_000_000),
        }
    }
}

impl LedgerConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ConfigFormat`] if the document is malformed.
    /// - [`LedgerError::InvalidConfiguration`] if a value is out of range.
    pub fn from_json(document: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(document)
            .map_err(|e| LedgerError::ConfigFormat(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the settings as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ConfigFormat`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::ConfigFormat(e.to_string()))
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfiguration`] for a zero block time.
    pub fn validate(&self) -> Result<()> {
        if self.block_time_ms == 0 {
            return Err(LedgerError::InvalidConfiguration(
                "block time must be positive",
            ));
        }
        Ok(())
    }
}
