//! Stake positions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, Amount, AssetId, Moment, Perbill, PoolId};
use crate::error::{LedgerError, Result};

/// Lock terms captured when a position is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Lock {
    /// Lock duration in seconds.
    pub duration: u64,
    /// Share of the stake slashed on early unstake.
    pub unlock_penalty: Perbill,
    /// Time the lock started, in milliseconds.
    pub started_at: Moment,
}

impl Lock {
    /// Time the lock ends, in milliseconds.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Overflow`].
    pub fn unlocks_at(&self) -> Result<Moment> {
        self.duration
            .checked_mul(1_000)
            .and_then(|ms| self.started_at.checked_add(ms))
            .ok_or(LedgerError::Overflow("lock end"))
    }

    /// Returns `true` while `now` is before the end of the lock.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Overflow`].
    pub fn is_locked(&self, now: Moment) -> Result<bool> {
        Ok(now < self.unlocks_at()?)
    }
}

/// A time-locked stake in a reward pool.
///
/// `share` is the reward weight and starts as the stake scaled by the
/// preset's multiplier.  `reward_checkpoints` holds, per reward asset, the
/// pool's accumulated reward per share when this position was last settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    /// Owner.
    pub owner: AccountId,
    /// Reward pool the stake belongs to.
    pub reward_pool_id: PoolId,
    /// Principal.
    pub stake: Amount,
    /// Reward weight.
    pub share: Amount,
    /// Lock terms.
    pub lock: Lock,
    pub(crate) reward_checkpoints: BTreeMap<AssetId, u128>,
}

impl StakePosition {
    /// Fails with [`LedgerError::MustBeOwner`] unless `caller` owns the position.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MustBeOwner`].
    pub fn ensure_owner(&self, caller: &AccountId) -> Result<()> {
        if self.owner == *caller {
            Ok(())
        } else {
            Err(LedgerError::MustBeOwner)
        }
    }

    /// Reward per share of `asset` at the last settlement.
    #[must_use]
    pub fn reward_checkpoint(&self, asset: AssetId) -> u128 {
        self.reward_checkpoints.get(&asset).copied().unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn lock_ends_after_duration_in_seconds() {
        let lock = Lock {
            duration: 60,
            unlock_penalty: Perbill::ZERO,
            started_at: 1_000,
        };
        assert_eq!(lock.unlocks_at(), Ok(61_000));
        assert_eq!(lock.is_locked(60_999), Ok(true));
        assert_eq!(lock.is_locked(61_000), Ok(false));
    }

    #[test]
    fn lock_end_overflow_is_reported() {
        let lock = Lock {
            duration: u64::MAX,
            unlock_penalty: Perbill::ZERO,
            started_at: 0,
        };
        assert!(lock.unlocks_at().is_err());
    }
}
