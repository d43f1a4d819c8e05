//! Reserve bookkeeping shared by every pool kind.

use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, Amount, AssetId, AssetPair, FeeConfig};
use crate::error::{LedgerError, Result};
use crate::math::CheckedArithmetic;
use crate::traits::PoolIdentity;

/// Owner, pair, fees and reserves of a pool.
///
/// Curve parameters live in the kind-specific pool types; everything that
/// moves on a trade or a deposit lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    owner: AccountId,
    pair: AssetPair,
    lp_token: AssetId,
    fee_config: FeeConfig,
    base_reserve: Amount,
    quote_reserve: Amount,
}

impl PoolState {
    /// Empty reserves for a new pool.
    #[must_use]
    pub const fn new(identity: PoolIdentity, pair: AssetPair, fee_config: FeeConfig) -> Self {
        Self {
            owner: identity.owner,
            pair,
            lp_token: identity.lp_token,
            fee_config,
            base_reserve: Amount::ZERO,
            quote_reserve: Amount::ZERO,
        }
    }

    /// Pool owner.
    #[must_use]
    pub const fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Asset pair.
    #[must_use]
    pub const fn pair(&self) -> AssetPair {
        self.pair
    }

    /// LP token id.
    #[must_use]
    pub const fn lp_token(&self) -> AssetId {
        self.lp_token
    }

    /// Fee configuration.
    #[must_use]
    pub const fn fee_config(&self) -> FeeConfig {
        self.fee_config
    }

    /// Base reserve.
    pub const fn base_reserve(&self) -> Amount {
        self.base_reserve
    }

    /// Quote reserve.
    pub const fn quote_reserve(&self) -> Amount {
        self.quote_reserve
    }

    /// Returns `true` while either reserve is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.base_reserve.is_zero() || self.quote_reserve.is_zero()
    }

    /// Reserve held in `asset`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAsset`] if `asset` is not in the pair.
    pub fn reserve_of(&self, asset: AssetId) -> Result<Amount> {
        if asset == self.pair.base() {
            Ok(self.base_reserve)
        } else if asset == self.pair.quote() {
            Ok(self.quote_reserve)
        } else {
            Err(LedgerError::InvalidAsset("asset is not part of the pool"))
        }
    }

    /// `(reserve_in, reserve_out)` for a trade paying in `asset_in`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAsset`] if `asset_in` is not in the pair.
    pub fn reserves_for(&self, asset_in: AssetId) -> Result<(Amount, Amount)> {
        let asset_out = self.pair.other(asset_in)?;
        Ok((self.reserve_of(asset_in)?, self.reserve_of(asset_out)?))
    }

    fn reserve_mut(&mut self, asset: AssetId) -> Result<&mut Amount> {
        if asset == self.pair.base() {
            Ok(&mut self.base_reserve)
        } else if asset == self.pair.quote() {
            Ok(&mut self.quote_reserve)
        } else {
            Err(LedgerError::InvalidAsset("asset is not part of the pool"))
        }
    }

    /// Adds `amount` to the reserve of `asset`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAsset`] or [`LedgerError::Overflow`].
    pub fn credit(&mut self, asset: AssetId, amount: Amount) -> Result<()> {
        let reserve = self.reserve_mut(asset)?;
        *reserve = reserve.safe_add(&amount)?;
        Ok(())
    }

    /// Removes `amount` from the reserve of `asset`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAsset`] or [`LedgerError::InsufficientLiquidity`].
    pub fn debit(&mut self, asset: AssetId, amount: Amount) -> Result<()> {
        let reserve = self.reserve_mut(asset)?;
        *reserve = reserve
            .checked_sub(&amount)
            .ok_or(LedgerError::InsufficientLiquidity)?;
        Ok(())
    }

    /// Empties both reserves and returns what they held.
    pub fn drain(&mut self) -> (Amount, Amount) {
        let drained = (self.base_reserve, self.quote_reserve);
        self.base_reserve = Amount::ZERO;
        self.quote_reserve = Amount::ZERO;
        drained
    }
}
