//! Reward pool state and share-based accrual.
//!
//! # Accrual
//!
//! Each reward asset keeps an accumulated reward per share, scaled by
//! [`REWARD_PRECISION`].  Accrual runs in whole reward periods:
//!
//! ```text
//! periods   = (until − last_updated_at) / period
//! emitted   = min(amount × periods, max_rewards − total_rewards, pot − unclaimed)
//! per_share += emitted × PRECISION / total_shares
//! ```
//!
//! `until` is the current time while the pool is open.  Past the end block
//! it is the time the end block was reached, estimated from the block time,
//! so periods that vested before the end still pay out while later ones never
//! do.  Periods elapsed while no shares are staked are dropped.
//!
//! A position keeps, per reward asset, the per-share value it was last
//! settled at.  Its pending reward is
//! `share × (per_share − checkpoint) / PRECISION`.  Emission stops growing
//! the per-share value once it would leave `u128`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::StakePosition;
use crate::config::{LockConfig, RewardConfig, RewardPoolConfig, RewardRate};
use crate::domain::{AccountId, Amount, AssetId, BlockNumber, Moment, Rounding};
use crate::error::{LedgerError, Result};
use crate::math::{mul_div, CheckedArithmetic};

/// Fixed-point scale of the accumulated reward per share.
pub const REWARD_PRECISION: u128 = 1_000_000_000_000;

/// Emission state of one reward asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    /// Cap and rate.
    pub config: RewardConfig,
    /// Rewards vested so far.
    pub total_rewards: Amount,
    /// Rewards paid out so far.
    pub claimed_rewards: Amount,
    /// Accumulated reward per share, scaled by [`REWARD_PRECISION`].
    pub reward_per_share: u128,
    /// Start of the current, not yet accrued period, in milliseconds.
    pub last_updated_at: Moment,
}

impl Reward {
    /// Fresh emission state starting at `now`.
    #[must_use]
    pub const fn new(config: RewardConfig, now: Moment) -> Self {
        Self {
            config,
            total_rewards: Amount::ZERO,
            claimed_rewards: Amount::ZERO,
            reward_per_share: 0,
            last_updated_at: now,
        }
    }

    /// Vested but not yet paid rewards.
    #[must_use]
    pub fn unclaimed(&self) -> Amount {
        self.total_rewards.saturating_sub(&self.claimed_rewards)
    }

    /// Accrues every whole period elapsed by `until` and returns the amount
    /// vested.
    ///
    /// # Errors
    ///
    /// Arithmetic failures.
    pub fn accrue(&mut self, until: Moment, total_shares: Amount, pot_balance: Amount) -> Result<Amount> {
        let period_ms = self.config.reward_rate.period_ms()?;
        let periods = until.saturating_sub(self.last_updated_at) / period_ms;
        if periods == 0 {
            return Ok(Amount::ZERO);
        }
        let last_updated_at = self
            .last_updated_at
            .checked_add(periods.saturating_mul(period_ms))
            .ok_or(LedgerError::Overflow("reward period boundary"))?;
        if total_shares.is_zero() {
            self.last_updated_at = last_updated_at;
            return Ok(Amount::ZERO);
        }

        let emission = self
            .config
            .reward_rate
            .amount
            .get()
            .saturating_mul(u128::from(periods));
        let cap = self.config.max_rewards.saturating_sub(&self.total_rewards);
        let funded = pot_balance.saturating_sub(&self.unclaimed());
        let emitted = Amount::new(emission).min(cap).min(funded);
        let (emitted, increment) = self.trackable(emitted, total_shares)?;
        let reward_per_share = self
            .reward_per_share
            .checked_add(increment)
            .ok_or(LedgerError::Overflow("reward per share"))?;
        let total_rewards = self.total_rewards.safe_add(&emitted)?;

        self.reward_per_share = reward_per_share;
        self.total_rewards = total_rewards;
        self.last_updated_at = last_updated_at;
        debug!(periods, emitted = %emitted, reward_per_share, "rewards accrued");
        Ok(emitted)
    }

    /// Clamps `emitted` to what the per-share value can still absorb and
    /// returns it with the matching per-share increment.
    fn trackable(&self, emitted: Amount, total_shares: Amount) -> Result<(Amount, u128)> {
        let headroom = u128::MAX - self.reward_per_share;
        match mul_div(emitted.get(), REWARD_PRECISION, total_shares.get(), Rounding::Down) {
            Ok(increment) if increment <= headroom => Ok((emitted, increment)),
            _ => {
                let fits = mul_div(headroom, total_shares.get(), REWARD_PRECISION, Rounding::Down)?;
                let increment = mul_div(fits, REWARD_PRECISION, total_shares.get(), Rounding::Down)?;
                Ok((Amount::new(fits), increment))
            }
        }
    }

    /// Reward earned by `share` since the per-share value was `checkpoint`.
    ///
    /// # Errors
    ///
    /// Arithmetic failures.
    pub fn earned_since(&self, share: Amount, checkpoint: u128) -> Result<u128> {
        mul_div(
            share.get(),
            self.reward_per_share.saturating_sub(checkpoint),
            REWARD_PRECISION,
            Rounding::Down,
        )
    }
}

/// A staking reward pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPool {
    /// Owner, allowed to update reward rates.
    pub owner: AccountId,
    /// Asset staked into the pool.
    pub staked_asset: AssetId,
    /// Block from which nothing accrues.
    pub end_block: BlockNumber,
    /// Lock terms.
    pub lock: LockConfig,
    /// Sum of the shares of every live position.
    pub total_shares: Amount,
    rewards: BTreeMap<AssetId, Reward>,
}

impl RewardPool {
    /// Opens a pool from a validated configuration at `now`.
    #[must_use]
    pub fn new(config: RewardPoolConfig, now: Moment) -> Self {
        Self {
            owner: config.owner,
            staked_asset: config.staked_asset,
            end_block: config.end_block,
            lock: config.lock,
            total_shares: Amount::ZERO,
            rewards: config
                .reward_configs
                .into_iter()
                .map(|(asset, cfg)| (asset, Reward::new(cfg, now)))
                .collect(),
        }
    }

    /// Emission state of `asset`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAsset`] if `asset` is not rewarded by the pool.
    pub fn reward(&self, asset: AssetId) -> Result<&Reward> {
        self.rewards
            .get(&asset)
            .ok_or(LedgerError::InvalidAsset("not a reward asset of this pool"))
    }

    /// Every reward asset with its emission state.
    pub fn rewards(&self) -> impl Iterator<Item = (AssetId, &Reward)> + '_ {
        self.rewards.iter().map(|(asset, reward)| (*asset, reward))
    }

    /// Returns `true` while rewards accrue at `block`.
    #[must_use]
    pub const fn is_active(&self, block: BlockNumber) -> bool {
        block < self.end_block
    }

    /// Time up to which rewards vest when observed at `block` and `now`.
    ///
    /// Past the end block this steps back `block_time_ms` per block beyond
    /// it, landing on the moment the end block was reached.
    #[must_use]
    pub const fn horizon(&self, block: BlockNumber, now: Moment, block_time_ms: u64) -> Moment {
        if self.is_active(block) {
            now
        } else {
            now.saturating_sub((block - self.end_block).saturating_mul(block_time_ms))
        }
    }

    /// Accrues every reward asset up to the pool's horizon.
    ///
    /// `pot_balance` reports the funded balance of a reward asset.
    ///
    /// # Errors
    ///
    /// Arithmetic failures.
    pub fn accrue(
        &mut self,
        block: BlockNumber,
        now: Moment,
        block_time_ms: u64,
        pot_balance: impl Fn(AssetId) -> Amount,
    ) -> Result<()> {
        let until = self.horizon(block, now, block_time_ms);
        let total_shares = self.total_shares;
        for (asset, reward) in &mut self.rewards {
            reward.accrue(until, total_shares, pot_balance(*asset))?;
        }
        Ok(())
    }

    /// Rewards owed to `position`, per asset, at the last accrual.
    ///
    /// # Errors
    ///
    /// Arithmetic failures.
    pub fn pending(&self, position: &StakePosition) -> Result<Vec<(AssetId, Amount)>> {
        let mut pending = Vec::with_capacity(self.rewards.len());
        for (asset, reward) in &self.rewards {
            let owed = reward.earned_since(position.share, position.reward_checkpoint(*asset))?;
            pending.push((*asset, Amount::new(owed)));
        }
        Ok(pending)
    }

    /// Current per-share value of every reward asset, the checkpoints of a
    /// position that is owed nothing right now.
    #[must_use]
    pub fn checkpoints(&self) -> BTreeMap<AssetId, u128> {
        self.rewards
            .iter()
            .map(|(asset, reward)| (*asset, reward.reward_per_share))
            .collect()
    }

    /// Records a payout of `amount` of `asset`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAsset`] or [`LedgerError::Overflow`].
    pub fn record_claim(&mut self, asset: AssetId, amount: Amount) -> Result<()> {
        let reward = self
            .rewards
            .get_mut(&asset)
            .ok_or(LedgerError::InvalidAsset("not a reward asset of this pool"))?;
        reward.claimed_rewards = reward.claimed_rewards.safe_add(&amount)?;
        Ok(())
    }

    /// Returns `amount` of vested `asset` to the unvested remainder, leaving
    /// it in the pot for later periods.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAsset`] or [`LedgerError::Underflow`].
    pub fn forfeit(&mut self, asset: AssetId, amount: Amount) -> Result<()> {
        let reward = self
            .rewards
            .get_mut(&asset)
            .ok_or(LedgerError::InvalidAsset("not a reward asset of this pool"))?;
        reward.total_rewards = reward.total_rewards.safe_sub(&amount)?;
        Ok(())
    }

    /// Replaces the rate of `asset`, effective from the current period.
    ///
    /// Call after [`RewardPool::accrue`] so that periods elapsed under the
    /// old rate stay vested at the old rate.  A new period length starts a
    /// fresh period grid at `now`, and the partial period under the old
    /// length is dropped.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAsset`] or [`LedgerError::InvalidConfiguration`].
    pub fn set_rate(&mut self, asset: AssetId, rate: RewardRate, now: Moment) -> Result<()> {
        rate.validate()?;
        let reward = self
            .rewards
            .get_mut(&asset)
            .ok_or(LedgerError::InvalidAsset("not a reward asset of this pool"))?;
        if reward.config.reward_rate.period_ms()? != rate.period_ms()? {
            reward.last_updated_at = reward.last_updated_at.max(now);
        }
        reward.config.reward_rate = rate;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Perbill;

    fn reward(amount: u128, max: u128) -> Reward {
        Reward::new(
            RewardConfig {
                max_rewards: Amount::new(max),
                reward_rate: RewardRate::per_seconds(10, Amount::new(amount)),
            },
            0,
        )
    }

    #[test]
    fn accrues_whole_periods_only() {
        let mut r = reward(100, u128::MAX);
        let shares = Amount::new(1_000);
        assert_eq!(r.accrue(9_999, shares, Amount::MAX), Ok(Amount::ZERO));
        assert_eq!(r.accrue(25_000, shares, Amount::MAX), Ok(Amount::new(200)));
        assert_eq!(r.last_updated_at, 20_000);
        assert_eq!(r.reward_per_share, 200 * REWARD_PRECISION / 1_000);
        assert_eq!(r.earned_since(Amount::new(500), 0), Ok(100));
        assert_eq!(r.earned_since(Amount::new(500), 100 * REWARD_PRECISION / 1_000), Ok(50));
    }

    #[test]
    fn emission_capped_by_max_rewards_and_pot() {
        let mut r = reward(100, 150);
        let shares = Amount::new(10);
        assert_eq!(r.accrue(100_000, shares, Amount::MAX), Ok(Amount::new(150)));
        assert_eq!(r.accrue(200_000, shares, Amount::MAX), Ok(Amount::ZERO));

        let mut r = reward(100, u128::MAX);
        assert_eq!(r.accrue(100_000, shares, Amount::new(40)), Ok(Amount::new(40)));
        // The pot still holds 40 but all of it is owed.
        assert_eq!(r.accrue(200_000, shares, Amount::new(40)), Ok(Amount::ZERO));
    }

    #[test]
    fn idle_periods_are_dropped() {
        let mut r = reward(100, u128::MAX);
        assert_eq!(r.accrue(50_000, Amount::ZERO, Amount::MAX), Ok(Amount::ZERO));
        assert_eq!(r.last_updated_at, 50_000);
        // An earlier horizon vests nothing.
        assert_eq!(r.accrue(40_000, Amount::new(1), Amount::MAX), Ok(Amount::ZERO));
        assert_eq!(r.last_updated_at, 50_000);
        assert_eq!(r.total_rewards, Amount::ZERO);
    }

    #[test]
    fn per_share_value_saturates_instead_of_failing() {
        let mut r = reward(u128::MAX / 2, u128::MAX);
        let one = Amount::new(1);
        let Ok(first) = r.accrue(10_000, one, Amount::MAX) else {
            panic!("accrued");
        };
        assert_eq!(first, Amount::new(u128::MAX / REWARD_PRECISION));
        assert_eq!(r.reward_per_share, first.get() * REWARD_PRECISION);
        assert_eq!(r.accrue(20_000, one, Amount::MAX), Ok(Amount::ZERO));
        assert_eq!(r.earned_since(one, 0), Ok(first.get()));
    }

    fn pool(end_block: BlockNumber) -> RewardPool {
        RewardPool::new(
            RewardPoolConfig {
                owner: AccountId::from_bytes([1; 32]),
                staked_asset: AssetId::new(1),
                end_block,
                reward_configs: BTreeMap::from([(
                    AssetId::new(2),
                    RewardConfig {
                        max_rewards: Amount::MAX,
                        reward_rate: RewardRate::per_seconds(10, Amount::new(100)),
                    },
                )]),
                lock: LockConfig {
                    duration_presets: BTreeMap::new(),
                    unlock_penalty: Perbill::ZERO,
                },
            },
            0,
        )
    }

    #[test]
    fn horizon_stops_at_end_block() {
        let pool = pool(100);
        assert_eq!(pool.horizon(99, 600_000, 6_000), 600_000);
        assert_eq!(pool.horizon(100, 600_000, 6_000), 600_000);
        assert_eq!(pool.horizon(110, 660_000, 6_000), 600_000);
        assert_eq!(pool.horizon(10_000, 1_000, 6_000), 0);
    }

    #[test]
    fn periods_vested_before_end_block_still_accrue() {
        let mut pool = pool(100);
        pool.total_shares = Amount::new(10);
        // Last observed at block 100; 60 periods had elapsed by then.
        let Ok(()) = pool.accrue(150, 900_000, 6_000, |_| Amount::MAX) else {
            panic!("accrued");
        };
        let Ok(reward) = pool.reward(AssetId::new(2)) else {
            panic!("reward asset");
        };
        assert_eq!(reward.total_rewards, Amount::new(6_000));
        assert_eq!(reward.last_updated_at, 600_000);
        let Ok(()) = pool.accrue(200, 1_200_000, 6_000, |_| Amount::MAX) else {
            panic!("accrued");
        };
        let Ok(reward) = pool.reward(AssetId::new(2)) else {
            panic!("reward asset");
        };
        assert_eq!(reward.total_rewards, Amount::new(6_000));
    }

    #[test]
    fn new_period_length_restarts_the_grid() {
        let mut pool = pool(u64::MAX);
        let asset = AssetId::new(2);
        pool.total_shares = Amount::new(10);
        let Ok(()) = pool.accrue(2, 15_000, 6_000, |_| Amount::MAX) else {
            panic!("accrued");
        };
        let Ok(()) = pool.set_rate(asset, RewardRate::per_seconds(10, Amount::new(7)), 15_000) else {
            panic!("same period");
        };
        assert_eq!(pool.reward(asset).map(|r| r.last_updated_at), Ok(10_000));
        let Ok(()) = pool.set_rate(asset, RewardRate::per_seconds(60, Amount::new(7)), 15_000) else {
            panic!("longer period");
        };
        let Ok(reward) = pool.reward(asset) else {
            panic!("reward asset");
        };
        assert_eq!(reward.last_updated_at, 15_000);
        assert_eq!(reward.total_rewards, Amount::new(100));
    }

    #[test]
    fn forfeited_rewards_return_to_the_pot() {
        let mut pool = pool(u64::MAX);
        let asset = AssetId::new(2);
        pool.total_shares = Amount::new(10);
        let Ok(()) = pool.accrue(2, 10_000, 6_000, |_| Amount::new(100)) else {
            panic!("accrued");
        };
        let Ok(()) = pool.forfeit(asset, Amount::new(40)) else {
            panic!("forfeited");
        };
        assert_eq!(pool.reward(asset).map(Reward::unclaimed), Ok(Amount::new(60)));
        assert!(pool.forfeit(asset, Amount::new(61)).is_err());
    }
}
