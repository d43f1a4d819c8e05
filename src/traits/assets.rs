//! Asset-transfer collaborator and atomic multi-leg settlement.
//!
//! Every liquidity, swap and staking operation moves balances through the
//! [`Assets`] trait.  Operations that move more than one balance build a
//! [`Settlement`], which dry-runs all legs against the current balances
//! before touching anything, so a failing leg never leaves earlier legs
//! applied.

use std::collections::BTreeMap;

use crate::domain::{AccountId, Amount, AssetId};
use crate::error::{LedgerError, Result};

/// Balance bookkeeping provided by the embedding runtime.
pub trait Assets {
    /// Free balance of `account` in `asset`.
    fn balance(&self, asset: AssetId, account: &AccountId) -> Amount;

    /// Existential deposit of `asset`.
    fn minimum_balance(&self, asset: AssetId) -> Amount;

    /// Moves `amount` of `asset` from `from` to `to`.
    ///
    /// With `keep_alive` the sender must keep at least the existential
    /// deposit.  The receiver must end at or above it.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InsufficientBalance`] if `from` holds less than `amount`.
    /// - [`LedgerError::ExistentialDeposit`] if either side would break the
    ///   existential deposit rule.
    fn transfer(
        &mut self,
        asset: AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
        keep_alive: bool,
    ) -> Result<()>;

    /// Checks that `account` can send `amount` of `asset`.
    ///
    /// # Errors
    ///
    /// Same as the sender side of [`Assets::transfer`].
    fn can_withdraw(
        &self,
        asset: AssetId,
        account: &AccountId,
        amount: Amount,
        keep_alive: bool,
    ) -> Result<()> {
        withdraw(
            self.balance(asset, account),
            amount,
            self.minimum_balance(asset),
            keep_alive,
        )
        .map(|_| ())
    }

    /// Returns `true` if `account` can receive `amount` of `asset` without
    /// staying below the existential deposit.
    fn can_deposit(&self, asset: AssetId, account: &AccountId, amount: Amount) -> bool {
        amount.is_zero()
            || deposit(
                self.balance(asset, account),
                amount,
                self.minimum_balance(asset),
            )
            .is_ok()
    }
}

/// Sender balance after withdrawing `amount`.
///
/// # Errors
///
/// See [`Assets::transfer`].
pub fn withdraw(
    balance: Amount,
    amount: Amount,
    minimum: Amount,
    keep_alive: bool,
) -> Result<Amount> {
    let remaining = balance
        .checked_sub(&amount)
        .ok_or(LedgerError::InsufficientBalance)?;
    if keep_alive && remaining < minimum {
        return Err(LedgerError::ExistentialDeposit);
    }
    Ok(remaining)
}

/// Receiver balance after depositing `amount`.
///
/// # Errors
///
/// - [`LedgerError::Overflow`] if the balance would not fit.
/// - [`LedgerError::ExistentialDeposit`] if the result stays below `minimum`.
pub fn deposit(balance: Amount, amount: Amount, minimum: Amount) -> Result<Amount> {
    let total = balance
        .checked_add(&amount)
        .ok_or(LedgerError::Overflow("account balance"))?;
    if total < minimum {
        return Err(LedgerError::ExistentialDeposit);
    }
    Ok(total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Leg {
    asset: AssetId,
    from: AccountId,
    to: AccountId,
    amount: Amount,
    keep_alive: bool,
}

/// An ordered batch of transfers that commits all-or-nothing.
///
/// Zero-amount and self transfers are dropped when pushed.
///
/// ```
/// use dex_ledger::domain::{AccountId, Amount, AssetId};
/// use dex_ledger::env::InMemoryAssets;
/// use dex_ledger::traits::{Assets, Settlement};
///
/// let (alice, bob) = (AccountId::from_bytes([1; 32]), AccountId::from_bytes([2; 32]));
/// let mut assets = InMemoryAssets::new(Amount::new(1));
/// assets.mint(AssetId::new(1), &alice, Amount::new(10)).expect("mint");
///
/// let overdrawn = Settlement::new()
///     .transfer(AssetId::new(1), alice, bob, Amount::new(6), false)
///     .transfer(AssetId::new(1), alice, bob, Amount::new(6), false);
/// assert!(overdrawn.execute(&mut assets).is_err());
/// assert_eq!(assets.balance(AssetId::new(1), &alice), Amount::new(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settlement {
    legs: Vec<Leg>,
}

impl Settlement {
    /// Empty settlement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transfer leg.
    #[must_use]
    pub fn transfer(
        mut self,
        asset: AssetId,
        from: AccountId,
        to: AccountId,
        amount: Amount,
        keep_alive: bool,
    ) -> Self {
        if !amount.is_zero() && from != to {
            self.legs.push(Leg {
                asset,
                from,
                to,
                amount,
                keep_alive,
            });
        }
        self
    }

    /// Number of legs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Returns `true` if there is nothing to move.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Dry-runs every leg in order against `assets`.
    ///
    /// # Errors
    ///
    /// The first error any leg would raise.
    pub fn verify<A: Assets + ?Sized>(&self, assets: &A) -> Result<()> {
        let mut balances: BTreeMap<(AssetId, AccountId), Amount> = BTreeMap::new();
        for leg in &self.legs {
            let minimum = assets.minimum_balance(leg.asset);
            let from = *balances
                .entry((leg.asset, leg.from))
                .or_insert_with(|| assets.balance(leg.asset, &leg.from));
            let from = withdraw(from, leg.amount, minimum, leg.keep_alive)?;
            balances.insert((leg.asset, leg.from), from);
            let to = *balances
                .entry((leg.asset, leg.to))
                .or_insert_with(|| assets.balance(leg.asset, &leg.to));
            let to = deposit(to, leg.amount, minimum)?;
            balances.insert((leg.asset, leg.to), to);
        }
        Ok(())
    }

    /// Verifies, then applies every leg.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::verify`]; nothing is moved in that case.
    pub fn execute<A: Assets + ?Sized>(self, assets: &mut A) -> Result<()> {
        self.verify(assets)?;
        for leg in self.legs {
            assets.transfer(leg.asset, &leg.from, &leg.to, leg.amount, leg.keep_alive)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::env::InMemoryAssets;

    #[test]
    fn keep_alive_protects_minimum() {
        let ed = Amount::new(10);
        assert_eq!(
            withdraw(Amount::new(100), Amount::new(95), ed, true),
            Err(LedgerError::ExistentialDeposit)
        );
        assert_eq!(
            withdraw(Amount::new(100), Amount::new(95), ed, false),
            Ok(Amount::new(5))
        );
        assert_eq!(
            withdraw(Amount::new(100), Amount::new(101), ed, false),
            Err(LedgerError::InsufficientBalance)
        );
    }

    #[test]
    fn receiver_must_reach_minimum() {
        let ed = Amount::new(10);
        assert_eq!(
            deposit(Amount::ZERO, Amount::new(9), ed),
            Err(LedgerError::ExistentialDeposit)
        );
        assert_eq!(deposit(Amount::new(1), Amount::new(9), ed), Ok(Amount::new(10)));
    }

    #[test]
    fn dust_below_minimum_cannot_be_deposited() {
        let (account, asset) = (AccountId::from_bytes([1; 32]), AssetId::new(1));
        let mut assets = InMemoryAssets::new(Amount::new(10));
        assert!(!assets.can_deposit(asset, &account, Amount::new(9)));
        assert!(assets.can_deposit(asset, &account, Amount::ZERO));
        let Ok(()) = assets.mint(asset, &account, Amount::new(10)) else {
            panic!("minted");
        };
        assert!(assets.can_deposit(asset, &account, Amount::new(1)));
    }

    #[test]
    fn trivial_legs_are_dropped() {
        let a = AccountId::from_bytes([1; 32]);
        let b = AccountId::from_bytes([2; 32]);
        let s = Settlement::new()
            .transfer(AssetId::new(1), a, a, Amount::new(5), true)
            .transfer(AssetId::new(1), a, b, Amount::ZERO, true);
        assert!(s.is_empty());
    }
}
