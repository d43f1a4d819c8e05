//! Directional pair of distinct assets.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::AssetId;
use crate::error::{LedgerError, Result};

/// A pair of distinct assets with a base and a quote side.
///
/// Pool identity ignores direction, but quotes and events are directional:
/// in a [`Swapped`](crate::events::Event::Swapped) event the base asset is
/// the one received and the quote asset the one paid.
///
/// # Examples
///
/// ```
/// use dex_ledger::domain::{AssetId, AssetPair};
///
/// let pair = AssetPair::new(AssetId::new(1), AssetId::new(2)).expect("distinct");
/// assert_eq!(pair.swap().base(), AssetId::new(2));
/// assert!(AssetPair::new(AssetId::new(1), AssetId::new(1)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetPair {
    base: AssetId,
    quote: AssetId,
}

impl AssetPair {
    /// Creates a pair.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfiguration`] if both sides are the
    /// same asset.
    pub const fn new(base: AssetId, quote: AssetId) -> Result<Self> {
        if base.get() == quote.get() {
            return Err(LedgerError::InvalidConfiguration(
                "base and quote assets must differ",
            ));
        }
        Ok(Self { base, quote })
    }

    /// Base asset.
    #[must_use]
    pub const fn base(&self) -> AssetId {
        self.base
    }

    /// Quote asset.
    #[must_use]
    pub const fn quote(&self) -> AssetId {
        self.quote
    }

    /// The same pair with sides exchanged.
    #[must_use]
    pub const fn swap(&self) -> Self {
        Self {
            base: self.quote,
            quote: self.base,
        }
    }

    /// Returns `true` if `asset` is either side of the pair.
    #[must_use]
    pub fn contains(&self, asset: AssetId) -> bool {
        self.base == asset || self.quote == asset
    }

    /// Returns the opposite side of `asset`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAsset`] if `asset` is not in the pair.
    pub fn other(&self, asset: AssetId) -> Result<AssetId> {
        if asset == self.base {
            Ok(self.quote)
        } else if asset == self.quote {
            Ok(self.base)
        } else {
            Err(LedgerError::InvalidAsset("asset is not part of the pool pair"))
        }
    }

    /// Returns `true` if both pairs hold the same assets in any order.
    #[must_use]
    pub fn same_assets(&self, other: &Self) -> bool {
        self == other || *self == other.swap()
    }
}

impl fmt::Display for AssetPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
