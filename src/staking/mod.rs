//! Staking rewards ledger: reward pools and time-locked positions.
//!
//! Stakes are escrowed by a derived account per reward pool and rewards are
//! paid from a separate pot account per pool, see
//! [`StakingRewardsLedger::escrow_account`] and
//! [`StakingRewardsLedger::pot_account`].  Every operation first accrues the
//! pool up to the call's time, then settles the touched position's pending
//! rewards before its share changes.
//!
//! # Position lifecycle
//!
//! ```text
//! stake ──► Locked ──(lock elapsed)──► Unlockable ──unstake──► Unstaked
//!             │                                               ▲
//!             └──────────────unstake (slashed)────────────────┘
//! ```

mod position;
mod reward_pool;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use position::{Lock, StakePosition};
pub use reward_pool::{Reward, RewardPool, REWARD_PRECISION};

use crate::config::{LedgerConfig, RewardPoolConfig, RewardRate};
use crate::context::CallContext;
use crate::domain::{
    AccountId, Amount, AssetId, BlockNumber, Moment, Permill, PoolId, PositionId,
};
use crate::error::{LedgerError, Result};
use crate::events::{Event, Receipt};
use crate::math::CheckedArithmetic;
use crate::traits::{Action, Assets, Authority, Settlement};

const ESCROW_TAG: [u8; 4] = *b"stkp";
const POT_TAG: [u8; 4] = *b"rwdp";

/// Outcome of closing a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnstakeOutcome {
    /// Principal paid back.
    pub returned_amount: Amount,
    /// Principal sent to the treasury as penalty.
    pub slashed_amount: Amount,
    /// Rewards paid alongside, per asset.
    pub rewards: Vec<(AssetId, Amount)>,
}

/// Reward pools and the positions staked in them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingRewardsLedger {
    pools: BTreeMap<PoolId, RewardPool>,
    positions: BTreeMap<PositionId, StakePosition>,
    next_pool_id: PoolId,
    next_position_id: PositionId,
    treasury: AccountId,
    block_time_ms: u64,
}

impl Default for StakingRewardsLedger {
    fn default() -> Self {
        Self::new(&LedgerConfig::default())
    }
}

impl StakingRewardsLedger {
    /// Empty ledger slashing into the treasury of `config` and dating end
    /// blocks with its block time.
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            pools: BTreeMap::new(),
            positions: BTreeMap::new(),
            next_pool_id: PoolId::FIRST,
            next_position_id: PositionId::FIRST,
            treasury: config.treasury,
            block_time_ms: config.block_time_ms,
        }
    }

    /// Account escrowing the stakes of `pool_id`.
    #[must_use]
    pub fn escrow_account(pool_id: PoolId) -> AccountId {
        AccountId::derive(ESCROW_TAG, pool_id.get())
    }

    /// Account holding the funded rewards of `pool_id`.
    #[must_use]
    pub fn pot_account(pool_id: PoolId) -> AccountId {
        AccountId::derive(POT_TAG, pool_id.get())
    }

    /// Looks up a reward pool.
    ///
    /// # Errors
    ///
    /// [`LedgerError::RewardPoolNotFound`].
    pub fn reward_pool(&self, pool_id: PoolId) -> Result<&RewardPool> {
        self.pools.get(&pool_id).ok_or(LedgerError::RewardPoolNotFound)
    }

    /// Looks up a position.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PositionNotFound`].
    pub fn position(&self, position_id: PositionId) -> Result<&StakePosition> {
        self.positions
            .get(&position_id)
            .ok_or(LedgerError::PositionNotFound)
    }

    /// Live positions owned by `owner`.
    pub fn positions_of<'a>(
        &'a self,
        owner: &'a AccountId,
    ) -> impl Iterator<Item = (PositionId, &'a StakePosition)> + 'a {
        self.positions
            .iter()
            .filter(move |(_, p)| p.owner == *owner)
            .map(|(id, p)| (*id, p))
    }

    /// Rewards `position_id` could claim at `block`/`now`.
    ///
    /// # Errors
    ///
    /// Lookup and arithmetic failures.
    pub fn pending_rewards<A: Assets + ?Sized>(
        &self,
        assets: &A,
        position_id: PositionId,
        block: BlockNumber,
        now: Moment,
    ) -> Result<Vec<(AssetId, Amount)>> {
        let position = self.position(position_id)?;
        let pool = self.accrued_pool(assets, position.reward_pool_id, block, now)?;
        let pending = pool.pending(position)?;
        debug!(%position_id, ?pending, "pending rewards");
        Ok(pending)
    }

    /// Opens a reward pool.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] unless the caller is authorized for
    ///   [`Action::CreateRewardPool`].
    /// - [`LedgerError::InvalidConfiguration`] for a malformed config.
    pub fn create_reward_pool<Z: Authority + ?Sized>(
        &mut self,
        caller: &AccountId,
        authority: &Z,
        config: RewardPoolConfig,
        block: BlockNumber,
        now: Moment,
    ) -> Result<Receipt<PoolId>> {
        if !authority.is_authorized(caller, Action::CreateRewardPool) {
            return Err(LedgerError::Unauthorized);
        }
        config.validate(block)?;
        let pool_id = self.next_pool_id;
        let next_pool_id = pool_id.next().ok_or(LedgerError::Overflow("reward pool id"))?;
        let pool = RewardPool::new(config, now);
        let event = Event::RewardPoolCreated {
            pool_id,
            owner: pool.owner,
            staked_asset: pool.staked_asset,
            end_block: pool.end_block,
        };
        info!(%pool_id, owner = %pool.owner, staked = %pool.staked_asset, "reward pool created");
        self.pools.insert(pool_id, pool);
        self.next_pool_id = next_pool_id;
        Ok(Receipt::new(pool_id, event))
    }

    /// Locks `amount` of the staked asset for `duration_preset` seconds.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::RewardPoolNotFound`].
    /// - [`LedgerError::InvalidDurationPreset`] for an unknown duration.
    /// - [`LedgerError::InvalidQuantity`] if no share would be earned.
    /// - Balance errors from settlement.
    pub fn stake<A: Assets + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        pool_id: PoolId,
        amount: Amount,
        duration_preset: u64,
        keep_alive: bool,
    ) -> Result<Receipt<PositionId>> {
        let mut pool = self.accrued_pool(&*ctx.assets, pool_id, ctx.block, ctx.now)?;
        if amount.is_zero() {
            return Err(LedgerError::InvalidQuantity("stake must be positive"));
        }
        let share = pool.lock.multiplier(duration_preset)?.mul_floor(amount)?;
        if share.is_zero() {
            return Err(LedgerError::InvalidQuantity("stake too small to earn a share"));
        }
        let position_id = self.next_position_id;
        let next_position_id = position_id
            .next()
            .ok_or(LedgerError::Overflow("position id"))?;
        pool.total_shares = pool.total_shares.safe_add(&share)?;
        let position = StakePosition {
            owner: ctx.caller,
            reward_pool_id: pool_id,
            stake: amount,
            share,
            lock: Lock {
                duration: duration_preset,
                unlock_penalty: pool.lock.unlock_penalty,
                started_at: ctx.now,
            },
            reward_checkpoints: pool.checkpoints(),
        };

        Settlement::new()
            .transfer(
                pool.staked_asset,
                ctx.caller,
                Self::escrow_account(pool_id),
                amount,
                keep_alive,
            )
            .execute(&mut *ctx.assets)?;
        self.pools.insert(pool_id, pool);
        self.positions.insert(position_id, position);
        self.next_position_id = next_position_id;

        info!(%pool_id, %position_id, account = %ctx.caller, %amount, duration_preset, "staked");
        Ok(Receipt::new(
            position_id,
            Event::Staked {
                pool_id,
                account: ctx.caller,
                amount,
                duration_preset,
                position_id,
                keep_alive,
            },
        ))
    }

    /// Adds `amount` to a position, keeping its unlock time.
    ///
    /// Pending rewards are paid out first.  Returns the new stake.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::PositionNotFound`].
    /// - [`LedgerError::MustBeOwner`].
    /// - Balance errors from settlement.
    pub fn extend<A: Assets + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        position_id: PositionId,
        amount: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<Amount>> {
        let mut position = self.position(position_id)?.clone();
        position.ensure_owner(&ctx.caller)?;
        if amount.is_zero() {
            return Err(LedgerError::InvalidQuantity("extension must be positive"));
        }
        let pool_id = position.reward_pool_id;
        let mut pool = self.accrued_pool(&*ctx.assets, pool_id, ctx.block, ctx.now)?;
        let added_share = pool
            .lock
            .multiplier(position.lock.duration)?
            .mul_floor(amount)?;
        let (settlement, rewards) =
            Self::settle_rewards(&*ctx.assets, &mut pool, &position, pool_id)?;

        position.stake = position.stake.safe_add(&amount)?;
        position.share = position.share.safe_add(&added_share)?;
        position.reward_checkpoints = pool.checkpoints();
        pool.total_shares = pool.total_shares.safe_add(&added_share)?;

        settlement
            .transfer(
                pool.staked_asset,
                ctx.caller,
                Self::escrow_account(pool_id),
                amount,
                keep_alive,
            )
            .execute(&mut *ctx.assets)?;
        let stake = position.stake;
        self.pools.insert(pool_id, pool);
        self.positions.insert(position_id, position);

        info!(%position_id, %amount, %stake, "stake extended");
        let mut events = Self::claimed_event(ctx.caller, position_id, rewards);
        events.push(Event::StakeAmountExtended {
            position_id,
            amount,
        });
        Ok(Receipt::with_events(stake, events))
    }

    /// Splits a position in two.  The source keeps `ratio` of its stake and
    /// share; a new position with the same lock holds the rest.
    ///
    /// Returns the source and new position ids.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidSplit`] if `ratio` is not strictly between 0 and
    /// 1, the position does not exist or belongs to someone else, or either
    /// half would be empty.
    pub fn split<A: Assets + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        position_id: PositionId,
        ratio: Permill,
    ) -> Result<Receipt<(PositionId, PositionId)>> {
        if ratio.is_zero() || ratio >= Permill::ONE {
            return Err(LedgerError::InvalidSplit(
                "ratio must lie strictly between 0% and 100%",
            ));
        }
        let mut source = self
            .positions
            .get(&position_id)
            .cloned()
            .ok_or(LedgerError::InvalidSplit("no such position"))?;
        if source.owner != ctx.caller {
            return Err(LedgerError::InvalidSplit("position belongs to another account"));
        }

        let stake_kept = ratio.mul_floor(source.stake)?;
        let share_kept = ratio.mul_floor(source.share)?;
        let stake_moved = source.stake.safe_sub(&stake_kept)?;
        let share_moved = source.share.safe_sub(&share_kept)?;
        if [stake_kept, share_kept, stake_moved, share_moved]
            .iter()
            .any(Amount::is_zero)
        {
            return Err(LedgerError::InvalidSplit("split leaves an empty position"));
        }

        let pool_id = source.reward_pool_id;
        let mut pool = self.accrued_pool(&*ctx.assets, pool_id, ctx.block, ctx.now)?;
        let (settlement, rewards) =
            Self::settle_rewards(&*ctx.assets, &mut pool, &source, pool_id)?;
        let new_id = self.next_position_id;
        let next_position_id = new_id.next().ok_or(LedgerError::Overflow("position id"))?;

        let split_off = StakePosition {
            owner: source.owner,
            reward_pool_id: pool_id,
            stake: stake_moved,
            share: share_moved,
            lock: source.lock,
            reward_checkpoints: pool.checkpoints(),
        };
        source.stake = stake_kept;
        source.share = share_kept;
        source.reward_checkpoints = pool.checkpoints();

        settlement.execute(&mut *ctx.assets)?;
        self.pools.insert(pool_id, pool);
        self.positions.insert(position_id, source);
        self.positions.insert(new_id, split_off);
        self.next_position_id = next_position_id;

        info!(%position_id, %new_id, kept = %stake_kept, moved = %stake_moved, "position split");
        let mut events = Self::claimed_event(ctx.caller, position_id, rewards);
        events.push(Event::SplitPosition {
            position_ids: vec![position_id, new_id],
            stakes: vec![stake_kept, stake_moved],
        });
        Ok(Receipt::with_events((position_id, new_id), events))
    }

    /// Closes a position, paying back its stake and rewards.
    ///
    /// Before the lock ends the unlock penalty is slashed from the stake
    /// and sent to the treasury.  A penalty the treasury cannot hold under
    /// the existential deposit is waived.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::PositionNotFound`].
    /// - [`LedgerError::MustBeOwner`].
    pub fn unstake<A: Assets + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        position_id: PositionId,
    ) -> Result<Receipt<UnstakeOutcome>> {
        let position = self.position(position_id)?.clone();
        position.ensure_owner(&ctx.caller)?;
        let pool_id = position.reward_pool_id;
        let mut pool = self.accrued_pool(&*ctx.assets, pool_id, ctx.block, ctx.now)?;
        let (settlement, rewards) =
            Self::settle_rewards(&*ctx.assets, &mut pool, &position, pool_id)?;

        let locked = position.lock.is_locked(ctx.now)?;
        let slashed_amount = if locked {
            position.lock.unlock_penalty.mul_floor(position.stake)?
        } else {
            Amount::ZERO
        };
        let slashed_amount = if ctx.assets.can_deposit(pool.staked_asset, &self.treasury, slashed_amount) {
            slashed_amount
        } else {
            debug!(%position_id, waived = %slashed_amount, "penalty below treasury minimum");
            Amount::ZERO
        };
        let returned_amount = position.stake.safe_sub(&slashed_amount)?;
        pool.total_shares = pool.total_shares.safe_sub(&position.share)?;

        let escrow = Self::escrow_account(pool_id);
        settlement
            .transfer(pool.staked_asset, escrow, position.owner, returned_amount, false)
            .transfer(pool.staked_asset, escrow, self.treasury, slashed_amount, false)
            .execute(&mut *ctx.assets)?;
        self.pools.insert(pool_id, pool);
        self.positions.remove(&position_id);

        info!(%position_id, returned = %returned_amount, slashed = %slashed_amount, "unstaked");
        let mut events = Self::claimed_event(position.owner, position_id, rewards.clone());
        events.push(if locked {
            Event::UnstakingSlashed {
                account: position.owner,
                position_id,
                slash_amount: slashed_amount,
            }
        } else {
            Event::Unstaked {
                account: position.owner,
                position_id,
            }
        });
        Ok(Receipt::with_events(
            UnstakeOutcome {
                returned_amount,
                slashed_amount,
                rewards,
            },
            events,
        ))
    }

    /// Pays a position's pending rewards to its owner.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::PositionNotFound`].
    /// - [`LedgerError::MustBeOwner`].
    pub fn claim<A: Assets + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        position_id: PositionId,
    ) -> Result<Receipt<Vec<(AssetId, Amount)>>> {
        let mut position = self.position(position_id)?.clone();
        position.ensure_owner(&ctx.caller)?;
        let pool_id = position.reward_pool_id;
        let mut pool = self.accrued_pool(&*ctx.assets, pool_id, ctx.block, ctx.now)?;
        let (settlement, rewards) =
            Self::settle_rewards(&*ctx.assets, &mut pool, &position, pool_id)?;
        position.reward_checkpoints = pool.checkpoints();

        settlement.execute(&mut *ctx.assets)?;
        self.pools.insert(pool_id, pool);
        self.positions.insert(position_id, position);

        info!(%position_id, ?rewards, "rewards claimed");
        Ok(Receipt::new(
            rewards.clone(),
            Event::Claimed {
                account: ctx.caller,
                position_id,
                rewards,
            },
        ))
    }

    /// Replaces the reward rates of `pool_id`.
    ///
    /// Periods elapsed before the call vest at the old rates.  A rate with a
    /// new period length restarts that asset's period grid at the call's
    /// time.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::RewardPoolNotFound`].
    /// - [`LedgerError::Unauthorized`] unless the caller owns the pool or is
    ///   authorized for [`Action::UpdateRewardsPool`].
    /// - [`LedgerError::InvalidAsset`] for an asset the pool does not reward.
    pub fn update_rewards_pool<A: Assets + ?Sized, Z: Authority + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        authority: &Z,
        pool_id: PoolId,
        reward_rates: BTreeMap<AssetId, RewardRate>,
    ) -> Result<Receipt<()>> {
        let owner = self.reward_pool(pool_id)?.owner;
        if ctx.caller != owner && !authority.is_authorized(&ctx.caller, Action::UpdateRewardsPool) {
            return Err(LedgerError::Unauthorized);
        }
        if reward_rates.is_empty() {
            return Err(LedgerError::InvalidConfiguration("no reward rates given"));
        }
        let mut pool = self.accrued_pool(&*ctx.assets, pool_id, ctx.block, ctx.now)?;
        for (asset, rate) in &reward_rates {
            pool.set_rate(*asset, *rate, ctx.now)?;
        }
        self.pools.insert(pool_id, pool);

        info!(%pool_id, updated = reward_rates.len(), "reward pool updated");
        Ok(Receipt::new(
            (),
            Event::RewardPoolUpdated {
                pool_id,
                reward_rates: reward_rates
                    .into_iter()
                    .map(|(asset, rate)| (asset, rate.amount))
                    .collect(),
            },
        ))
    }

    /// Funds the reward pot of `asset`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::RewardPoolNotFound`].
    /// - [`LedgerError::InvalidAsset`] for an asset the pool does not reward.
    /// - Balance errors from settlement.
    pub fn add_to_rewards_pot<A: Assets + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        pool_id: PoolId,
        asset: AssetId,
        amount: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<()>> {
        let pool = self.accrued_pool(&*ctx.assets, pool_id, ctx.block, ctx.now)?;
        pool.reward(asset)?;
        if amount.is_zero() {
            return Err(LedgerError::InvalidQuantity("funding must be positive"));
        }
        Settlement::new()
            .transfer(asset, ctx.caller, Self::pot_account(pool_id), amount, keep_alive)
            .execute(&mut *ctx.assets)?;
        self.pools.insert(pool_id, pool);

        info!(%pool_id, %asset, %amount, "rewards pot increased");
        Ok(Receipt::new(
            (),
            Event::RewardsPotIncreased {
                pool_id,
                asset_id: asset,
                amount,
            },
        ))
    }

    fn accrued_pool<A: Assets + ?Sized>(
        &self,
        assets: &A,
        pool_id: PoolId,
        block: BlockNumber,
        now: Moment,
    ) -> Result<RewardPool> {
        let mut pool = self.reward_pool(pool_id)?.clone();
        let pot = Self::pot_account(pool_id);
        pool.accrue(block, now, self.block_time_ms, |asset| assets.balance(asset, &pot))?;
        Ok(pool)
    }

    /// Adds pot-to-owner legs for everything `position` is owed and records
    /// the payouts on `pool`.
    ///
    /// A reward the owner cannot hold under the existential deposit is
    /// forfeited back to the pot.
    fn settle_rewards<A: Assets + ?Sized>(
        assets: &A,
        pool: &mut RewardPool,
        position: &StakePosition,
        pool_id: PoolId,
    ) -> Result<(Settlement, Vec<(AssetId, Amount)>)> {
        let pot = Self::pot_account(pool_id);
        let mut settlement = Settlement::new();
        let mut paid = Vec::new();
        for (asset, amount) in pool.pending(position)? {
            if amount.is_zero() {
                continue;
            }
            if !assets.can_deposit(asset, &position.owner, amount) {
                debug!(%asset, %amount, owner = %position.owner, "reward below minimum balance forfeited");
                pool.forfeit(asset, amount)?;
                continue;
            }
            pool.record_claim(asset, amount)?;
            settlement = settlement.transfer(asset, pot, position.owner, amount, false);
            paid.push((asset, amount));
        }
        Ok((settlement, paid))
    }

    fn claimed_event(
        account: AccountId,
        position_id: PositionId,
        rewards: Vec<(AssetId, Amount)>,
    ) -> Vec<Event> {
        if rewards.is_empty() {
            Vec::new()
        } else {
            vec![Event::Claimed {
                account,
                position_id,
                rewards,
            }]
        }
    }
}
