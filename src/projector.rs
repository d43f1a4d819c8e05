//! Read-optimized aggregates built from ledger events.
//!
//! The projector never reads ledger state: it folds [`Event`]s in commit
//! order.  Counters saturate instead of failing so a replay can always
//! complete.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::PoolKind;
use crate::domain::{AccountId, Amount, AssetId, AssetPair, PoolId, PositionId};
use crate::events::Event;

/// Trading and liquidity statistics of one AMM pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Owner.
    pub owner: AccountId,
    /// Asset pair.
    pub pair: AssetPair,
    /// Pool family.
    pub kind: PoolKind,
    /// Settled trades.
    pub trade_count: u64,
    /// Base asset moved by trades, either direction.
    pub base_volume: Amount,
    /// Quote asset moved by trades, either direction.
    pub quote_volume: Amount,
    /// Fees charged, per asset.
    pub fees: BTreeMap<AssetId, Amount>,
    /// Deposits.
    pub liquidity_adds: u64,
    /// Withdrawals.
    pub liquidity_removes: u64,
    /// Accounts currently holding LP tokens.
    pub lp_positions: usize,
    /// Set once the pool is deleted.
    pub deleted: bool,
}

/// Lifecycle status of a stake position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionStatus {
    /// Live.
    Locked,
    /// Closed after its lock.
    Unstaked,
    /// Closed early, `slashed` taken as penalty.
    Slashed {
        /// Slashed principal.
        slashed: Amount,
    },
}

/// Summary of one stake position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSummary {
    /// Owner.
    pub owner: AccountId,
    /// Reward pool.
    pub reward_pool_id: PoolId,
    /// Current principal.
    pub stake: Amount,
    /// Status.
    pub status: PositionStatus,
    /// Rewards paid, per asset.
    pub claimed: BTreeMap<AssetId, Amount>,
}

/// Staking totals of one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTotals {
    /// Principal in live positions.
    pub staked: Amount,
    /// Principal lost to penalties.
    pub slashed: Amount,
    /// Live positions.
    pub live_positions: u64,
    /// Rewards paid, per asset.
    pub claimed: BTreeMap<AssetId, Amount>,
}

/// Folds events into [`PoolStats`], [`PositionSummary`] and
/// [`AccountTotals`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventProjector {
    pools: BTreeMap<PoolId, PoolStats>,
    lp_holders: BTreeMap<(PoolId, AccountId), Amount>,
    positions: BTreeMap<PositionId, PositionSummary>,
    accounts: BTreeMap<AccountId, AccountTotals>,
    applied: u64,
}

fn add_to(map: &mut BTreeMap<AssetId, Amount>, asset: AssetId, amount: Amount) {
    let slot = map.entry(asset).or_default();
    *slot = slot.saturating_add(&amount);
}

impl EventProjector {
    /// Empty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events folded so far.
    pub const fn applied(&self) -> u64 {
        self.applied
    }

    /// Statistics of an AMM pool.
    pub fn pool_stats(&self, pool_id: PoolId) -> Option<&PoolStats> {
        self.pools.get(&pool_id)
    }

    /// Summary of a position, live or closed.
    pub fn position(&self, position_id: PositionId) -> Option<&PositionSummary> {
        self.positions.get(&position_id)
    }

    /// Staking totals of an account.
    pub fn account(&self, account: &AccountId) -> Option<&AccountTotals> {
        self.accounts.get(account)
    }

    /// Folds every event in order.
    pub fn apply_all<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) {
        for event in events {
            self.apply(event);
        }
    }

    /// Folds one event.
    pub fn apply(&mut self, event: &Event) {
        self.applied = self.applied.saturating_add(1);
        match event {
            Event::PoolCreated {
                pool_id,
                owner,
                pair,
                kind,
                ..
            } => {
                self.pools.insert(
                    *pool_id,
                    PoolStats {
                        owner: *owner,
                        pair: *pair,
                        kind: *kind,
                        trade_count: 0,
                        base_volume: Amount::ZERO,
                        quote_volume: Amount::ZERO,
                        fees: BTreeMap::new(),
                        liquidity_adds: 0,
                        liquidity_removes: 0,
                        lp_positions: 0,
                        deleted: false,
                    },
                );
            }
            Event::PoolDeleted { pool_id, .. } => {
                if let Some(stats) = self.pools.get_mut(pool_id) {
                    stats.deleted = true;
                    stats.lp_positions = 0;
                }
                self.lp_holders.retain(|(id, _), _| id != pool_id);
            }
            Event::LiquidityAdded {
                account,
                pool_id,
                minted_lp,
                ..
            } => {
                let held = self.lp_holders.entry((*pool_id, *account)).or_default();
                *held = held.saturating_add(minted_lp);
                let holders = self.holders(*pool_id);
                if let Some(stats) = self.pools.get_mut(pool_id) {
                    stats.liquidity_adds = stats.liquidity_adds.saturating_add(1);
                    stats.lp_positions = holders;
                }
            }
            Event::LiquidityRemoved {
                account,
                pool_id,
                burned_lp,
                ..
            } => {
                let key = (*pool_id, *account);
                let left = self
                    .lp_holders
                    .get(&key)
                    .copied()
                    .unwrap_or_default()
                    .saturating_sub(burned_lp);
                if left.is_zero() {
                    self.lp_holders.remove(&key);
                } else {
                    self.lp_holders.insert(key, left);
                }
                let holders = self.holders(*pool_id);
                if let Some(stats) = self.pools.get_mut(pool_id) {
                    stats.liquidity_removes = stats.liquidity_removes.saturating_add(1);
                    stats.lp_positions = holders;
                }
            }
            Event::Swapped {
                pool_id,
                base_asset,
                quote_asset,
                base_amount,
                quote_amount,
                fee,
                ..
            } => {
                let Some(stats) = self.pools.get_mut(pool_id) else {
                    trace!(%pool_id, "swap for unknown pool skipped");
                    return;
                };
                stats.trade_count = stats.trade_count.saturating_add(1);
                for (asset, amount) in [(*base_asset, *base_amount), (*quote_asset, *quote_amount)] {
                    if asset == stats.pair.base() {
                        stats.base_volume = stats.base_volume.saturating_add(&amount);
                    } else {
                        stats.quote_volume = stats.quote_volume.saturating_add(&amount);
                    }
                }
                add_to(&mut stats.fees, *quote_asset, fee.fee);
            }
            Event::Staked {
                pool_id,
                account,
                amount,
                position_id,
                ..
            } => {
                self.positions.insert(
                    *position_id,
                    PositionSummary {
                        owner: *account,
                        reward_pool_id: *pool_id,
                        stake: *amount,
                        status: PositionStatus::Locked,
                        claimed: BTreeMap::new(),
                    },
                );
                let totals = self.accounts.entry(*account).or_default();
                totals.staked = totals.staked.saturating_add(amount);
                totals.live_positions = totals.live_positions.saturating_add(1);
            }
            Event::StakeAmountExtended {
                position_id,
                amount,
            } => {
                let Some(summary) = self.positions.get_mut(position_id) else {
                    return;
                };
                summary.stake = summary.stake.saturating_add(amount);
                let totals = self.accounts.entry(summary.owner).or_default();
                totals.staked = totals.staked.saturating_add(amount);
            }
            Event::SplitPosition {
                position_ids,
                stakes,
            } => self.split(position_ids, stakes),
            Event::Unstaked {
                account,
                position_id,
            } => self.close(account, *position_id, PositionStatus::Unstaked),
            Event::UnstakingSlashed {
                account,
                position_id,
                slash_amount,
            } => self.close(
                account,
                *position_id,
                PositionStatus::Slashed {
                    slashed: *slash_amount,
                },
            ),
            Event::Claimed {
                account,
                position_id,
                rewards,
            } => {
                let totals = self.accounts.entry(*account).or_default();
                for (asset, amount) in rewards {
                    add_to(&mut totals.claimed, *asset, *amount);
                }
                if let Some(summary) = self.positions.get_mut(position_id) {
                    for (asset, amount) in rewards {
                        add_to(&mut summary.claimed, *asset, *amount);
                    }
                }
            }
            Event::RewardPoolCreated { .. }
            | Event::RewardPoolUpdated { .. }
            | Event::RewardsPotIncreased { .. } => {}
        }
    }

    fn holders(&self, pool_id: PoolId) -> usize {
        self.lp_holders
            .keys()
            .filter(|(id, _)| *id == pool_id)
            .count()
    }

    fn split(&mut self, position_ids: &[PositionId], stakes: &[Amount]) {
        let ([source, created], [kept, moved]) = (position_ids, stakes) else {
            trace!(?position_ids, "malformed split skipped");
            return;
        };
        let Some(summary) = self.positions.get_mut(source) else {
            return;
        };
        summary.stake = *kept;
        let new_summary = PositionSummary {
            owner: summary.owner,
            reward_pool_id: summary.reward_pool_id,
            stake: *moved,
            status: PositionStatus::Locked,
            claimed: BTreeMap::new(),
        };
        let totals = self.accounts.entry(new_summary.owner).or_default();
        totals.live_positions = totals.live_positions.saturating_add(1);
        self.positions.insert(*created, new_summary);
    }

    fn close(&mut self, account: &AccountId, position_id: PositionId, status: PositionStatus) {
        let Some(summary) = self.positions.get_mut(&position_id) else {
            return;
        };
        summary.status = status;
        let stake = summary.stake;
        let totals = self.accounts.entry(*account).or_default();
        totals.staked = totals.staked.saturating_sub(&stake);
        totals.live_positions = totals.live_positions.saturating_sub(1);
        if let PositionStatus::Slashed { slashed } = status {
            totals.slashed = totals.slashed.saturating_add(&slashed);
        }
    }
}
