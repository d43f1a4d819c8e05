//! In-memory balances with an existential deposit.

use std::collections::BTreeMap;

use tracing::trace;

use crate::domain::{AccountId, Amount, AssetId};
use crate::error::Result;
use crate::traits::{deposit, withdraw, Assets};

/// Balances keyed by `(asset, account)`.
///
/// One existential deposit applies to every asset unless overridden with
/// [`InMemoryAssets::set_minimum_balance`].  Accounts left with dust below
/// it after a non-keep-alive transfer keep the dust.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryAssets {
    balances: BTreeMap<(AssetId, AccountId), Amount>,
    existential_deposit: Amount,
    overrides: BTreeMap<AssetId, Amount>,
}

impl InMemoryAssets {
    /// Empty ledger with `existential_deposit` for every asset.
    pub fn new(existential_deposit: Amount) -> Self {
        Self {
            balances: BTreeMap::new(),
            existential_deposit,
            overrides: BTreeMap::new(),
        }
    }

    /// Overrides the existential deposit of one asset.
    pub fn set_minimum_balance(&mut self, asset: AssetId, minimum: Amount) {
        self.overrides.insert(asset, minimum);
    }

    /// Credits freshly issued `amount` to `account`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Overflow`](crate::error::LedgerError::Overflow) or
    /// [`LedgerError::ExistentialDeposit`](crate::error::LedgerError::ExistentialDeposit).
    pub fn mint(&mut self, asset: AssetId, account: &AccountId, amount: Amount) -> Result<()> {
        let current = self.balance(asset, account);
        let updated = deposit(current, amount, self.minimum_balance(asset))?;
        self.balances.insert((asset, *account), updated);
        Ok(())
    }

    /// Sum of all balances of `asset`.
    pub fn total_issuance(&self, asset: AssetId) -> Amount {
        self.balances
            .iter()
            .filter(|((a, _), _)| *a == asset)
            .fold(Amount::ZERO, |acc, (_, v)| acc.saturating_add(v))
    }

    fn store(&mut self, asset: AssetId, account: &AccountId, amount: Amount) {
        if amount.is_zero() {
            self.balances.remove(&(asset, *account));
        } else {
            self.balances.insert((asset, *account), amount);
        }
    }
}

impl Assets for InMemoryAssets {
    fn balance(&self, asset: AssetId, account: &AccountId) -> Amount {
        self.balances
            .get(&(asset, *account))
            .copied()
            .unwrap_or_default()
    }

    fn minimum_balance(&self, asset: AssetId) -> Amount {
        self.overrides
            .get(&asset)
            .copied()
            .unwrap_or(self.existential_deposit)
    }

    fn transfer(
        &mut self,
        asset: AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
        keep_alive: bool,
    ) -> Result<()> {
        if amount.is_zero() || from == to {
            return Ok(());
        }
        let minimum = self.minimum_balance(asset);
        let sender = withdraw(self.balance(asset, from), amount, minimum, keep_alive)?;
        let receiver = deposit(self.balance(asset, to), amount, minimum)?;
        self.store(asset, from, sender);
        self.store(asset, to, receiver);
        trace!(%asset, %from, %to, %amount, "transfer");
        Ok(())
    }
}
