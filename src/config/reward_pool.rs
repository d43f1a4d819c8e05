//! Configuration for staking reward pools.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{AccountId, Amount, AssetId, BlockNumber, Perbill};
use crate::error::{LedgerError, Result};

/// Emission of `amount` reward units every `period` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewardRate {
    /// Emission period in seconds.
    pub period: u64,
    /// Units emitted per period.
    pub amount: Amount,
}

impl RewardRate {
    /// Creates a rate of `amount` per `period` seconds.
    #[must_use]
    pub const fn per_seconds(period: u64, amount: Amount) -> Self {
        Self { period, amount }
    }

    /// Period length in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] for absurd periods.
    pub fn period_ms(&self) -> Result<u64> {
        self.period
            .checked_mul(1_000)
            .ok_or(LedgerError::Overflow("reward period in milliseconds"))
    }

    /// Validates the rate.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfiguration`] for a zero period.
    pub fn validate(&self) -> Result<()> {
        if self.period == 0 {
            return Err(LedgerError::InvalidConfiguration(
                "reward period must be positive",
            ));
        }
        self.period_ms().map(|_| ())
    }
}

/// Emission schedule of one reward asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Lifetime cap on emitted rewards.
    pub max_rewards: Amount,
    /// Emission rate.
    pub reward_rate: RewardRate,
}

/// Lock terms offered by a reward pool.
///
/// Each preset maps a lock duration in seconds to the reward multiplier
/// applied to stakes locked for that long.  `unlock_penalty` is the share
/// of principal slashed when a position is unstaked before its lock ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Duration in seconds to reward multiplier.
    pub duration_presets: BTreeMap<u64, Perbill>,
    /// Share of principal slashed on early unstake.
    pub unlock_penalty: Perbill,
}

impl LockConfig {
    /// Multiplier for a configured duration.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidDurationPreset`] for unknown durations.
    pub fn multiplier(&self, duration: u64) -> Result<Perbill> {
        self.duration_presets
            .get(&duration)
            .copied()
            .ok_or(LedgerError::InvalidDurationPreset)
    }

    /// Validates the lock terms.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfiguration`] if no preset exists or
    /// a preset has a zero duration or zero multiplier.
    pub fn validate(&self) -> Result<()> {
        if self.duration_presets.is_empty() {
            return Err(LedgerError::InvalidConfiguration(
                "at least one duration preset is required",
            ));
        }
        for (duration, multiplier) in &self.duration_presets {
            if *duration == 0 {
                return Err(LedgerError::InvalidConfiguration(
                    "lock durations must be positive",
                ));
            }
            if multiplier.is_zero() {
                return Err(LedgerError::InvalidConfiguration(
                    "reward multipliers must be positive",
                ));
            }
        }
        Ok(())
    }
}

/// Everything needed to open a staking reward pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPoolConfig {
    /// Account allowed to update the reward rates.
    pub owner: AccountId,
    /// Asset staked into the pool.
    pub staked_asset: AssetId,
    /// Block after which no more rewards accrue.
    pub end_block: BlockNumber,
    /// Emission schedule per reward asset.
    pub reward_configs: BTreeMap<AssetId, RewardConfig>,
    /// Lock terms.
    pub lock: LockConfig,
}

impl RewardPoolConfig {
    /// Validates the configuration against the current block.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfiguration`] if there are no reward
    /// configs, a rate or lock preset is invalid, or `end_block` is not in
    /// the future.
    pub fn validate(&self, current_block: BlockNumber) -> Result<()> {
        if self.reward_configs.is_empty() {
            return Err(LedgerError::InvalidConfiguration(
                "at least one reward config is required",
            ));
        }
        for config in self.reward_configs.values() {
            config.reward_rate.validate()?;
        }
        if self.end_block <= current_block {
            return Err(LedgerError::InvalidConfiguration(
                "end block must be in the future",
            ));
        }
        self.lock.validate()
    }
}
