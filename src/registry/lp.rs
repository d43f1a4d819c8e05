//! LP token balances and supply.

use std::collections::BTreeMap;

use crate::domain::{AccountId, Amount, AssetId};
use crate::error::{LedgerError, Result};
use crate::math::CheckedArithmetic;

/// Fungible LP balances keyed by `(lp_token, account)` with per-token supply.
///
/// Supply always equals the sum of the balances of its token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LpLedger {
    balances: BTreeMap<(AssetId, AccountId), Amount>,
    supply: BTreeMap<AssetId, Amount>,
}

impl LpLedger {
    /// Balance of `account` in `lp_token`.
    pub fn balance_of(&self, lp_token: AssetId, account: &AccountId) -> Amount {
        self.balances
            .get(&(lp_token, *account))
            .copied()
            .unwrap_or_default()
    }

    /// Outstanding supply of `lp_token`.
    pub fn total_supply(&self, lp_token: AssetId) -> Amount {
        self.supply.get(&lp_token).copied().unwrap_or_default()
    }

    /// Number of accounts holding `lp_token`.
    #[must_use]
    pub fn holders(&self, lp_token: AssetId) -> usize {
        self.balances.keys().filter(|(t, _)| *t == lp_token).count()
    }

    /// Checks that `amount` can be minted without overflow.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Overflow`].
    pub fn can_mint(&self, lp_token: AssetId, account: &AccountId, amount: Amount) -> Result<()> {
        self.total_supply(lp_token).safe_add(&amount)?;
        self.balance_of(lp_token, account).safe_add(&amount)?;
        Ok(())
    }

    /// Mints `amount` to `account`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Overflow`].
    pub fn mint(&mut self, lp_token: AssetId, account: &AccountId, amount: Amount) -> Result<()> {
        self.can_mint(lp_token, account, amount)?;
        let supply = self.total_supply(lp_token).safe_add(&amount)?;
        let balance = self.balance_of(lp_token, account).safe_add(&amount)?;
        self.supply.insert(lp_token, supply);
        self.balances.insert((lp_token, *account), balance);
        Ok(())
    }

    /// Burns `amount` from `account`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientLpBalance`] if the account holds less.
    pub fn burn(&mut self, lp_token: AssetId, account: &AccountId, amount: Amount) -> Result<()> {
        let balance = self
            .balance_of(lp_token, account)
            .checked_sub(&amount)
            .ok_or(LedgerError::InsufficientLpBalance)?;
        let supply = self
            .total_supply(lp_token)
            .checked_sub(&amount)
            .ok_or(LedgerError::Underflow("LP supply"))?;
        if balance.is_zero() {
            self.balances.remove(&(lp_token, *account));
        } else {
            self.balances.insert((lp_token, *account), balance);
        }
        if supply.is_zero() {
            self.supply.remove(&lp_token);
        } else {
            self.supply.insert(lp_token, supply);
        }
        Ok(())
    }
}
