//! The [`Ledger`] façade: registry, staking ledger and collaborators in one
//! owner.
//!
//! Each operation reads the block and time from the clock, runs against the
//! owned asset ledger and authority, logs rejections and feeds the committed
//! events to the attached [`EventProjector`].
//!
//! ```
//! use dex_ledger::config::{ConstantProductConfig, LedgerConfig, PoolConfig};
//! use dex_ledger::domain::{AccountId, Amount, AssetId, AssetPair, FeeConfig};
//! use dex_ledger::ledger::Ledger;
//!
//! let alice = AccountId::from_bytes([1; 32]);
//! let (usd, dot) = (AssetId::new(1), AssetId::new(2));
//! let mut ledger = Ledger::from_config(LedgerConfig::default()).with_projector();
//! ledger.assets_mut().mint(usd, &alice, Amount::new(1_000_000)).expect("minted");
//! ledger.assets_mut().mint(dot, &alice, Amount::new(1_000_000)).expect("minted");
//!
//! let pair = AssetPair::new(usd, dot).expect("distinct");
//! let fee = FeeConfig::new(3_000, 0, 0).expect("valid fee");
//! let config = PoolConfig::ConstantProduct(ConstantProductConfig::balanced(pair, fee).expect("valid"));
//! let pool = ledger.create_pool(alice, alice, config).expect("created").outcome;
//! ledger
//!     .add_liquidity(alice, pool, Amount::new(500_000), Amount::new(500_000), Amount::ZERO, true)
//!     .expect("seeded");
//! let sold = ledger
//!     .sell(alice, pool, usd, Amount::new(1_000), Amount::ZERO, true)
//!     .expect("sold");
//! assert!(sold.outcome.base_amount.get() > 0);
//! assert_eq!(ledger.projector().and_then(|p| p.pool_stats(pool)).map(|s| s.trade_count), Some(1));
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::warn;

use crate::config::{LedgerConfig, PoolConfig, RewardPoolConfig, RewardRate};
use crate::context::CallContext;
use crate::domain::{
    AccountId, AddLiquidityOutcome, Amount, AssetId, AssetPair, Permill, PoolId, PositionId,
    RemoveLiquidityOutcome, SwapOutcome, SwapQuote,
};
use crate::env::{InMemoryAssets, ManualClock, PolicyAuthority};
use crate::error::Result;
use crate::events::Receipt;
use crate::projector::EventProjector;
use crate::registry::PoolRegistry;
use crate::staking::{StakingRewardsLedger, UnstakeOutcome};
use crate::traits::{Assets, Authority, Clock};

/// Owns the pool registry, the staking ledger and their collaborators.
#[derive(Debug, Clone)]
pub struct Ledger<A = InMemoryAssets, C = ManualClock, Z = PolicyAuthority> {
    config: LedgerConfig,
    registry: PoolRegistry,
    staking: StakingRewardsLedger,
    assets: A,
    clock: C,
    authority: Z,
    projector: Option<EventProjector>,
}

impl Ledger {
    /// In-memory ledger: balances with the configured existential deposit,
    /// a manual clock and the configured managers.
    pub fn from_config(config: LedgerConfig) -> Self {
        let assets = InMemoryAssets::new(config.existential_deposit);
        let clock = ManualClock::new(config.block_time_ms);
        let authority = PolicyAuthority::new(config.managers.iter().copied());
        Self::with_collaborators(config, assets, clock, authority)
    }

    /// In-memory ledger from a JSON settings document.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ConfigFormat`](crate::error::LedgerError::ConfigFormat)
    /// or [`LedgerError::InvalidConfiguration`](crate::error::LedgerError::InvalidConfiguration).
    pub fn from_json(document: &str) -> Result<Self> {
        LedgerConfig::from_json(document).map(Self::from_config)
    }
}

impl<A: Assets, C: Clock, Z: Authority> Ledger<A, C, Z> {
    /// Ledger over caller-supplied collaborators.
    pub fn with_collaborators(config: LedgerConfig, assets: A, clock: C, authority: Z) -> Self {
        Self {
            registry: PoolRegistry::new(&config),
            staking: StakingRewardsLedger::new(&config),
            config,
            assets,
            clock,
            authority,
            projector: None,
        }
    }

    /// Attaches an empty [`EventProjector`].
    #[must_use]
    pub fn with_projector(mut self) -> Self {
        self.projector = Some(EventProjector::new());
        self
    }

    /// Settings the ledger was built from.
    pub const fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// AMM pools.
    pub const fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    /// Reward pools and positions.
    pub const fn staking(&self) -> &StakingRewardsLedger {
        &self.staking
    }

    /// Balances.
    pub const fn assets(&self) -> &A {
        &self.assets
    }

    /// Mutable balances, for funding accounts.
    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    /// Clock.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Mutable authority.
    pub fn authority_mut(&mut self) -> &mut Z {
        &mut self.authority
    }

    /// Attached projection, if any.
    pub const fn projector(&self) -> Option<&EventProjector> {
        self.projector.as_ref()
    }

    fn record<T>(&mut self, operation: &'static str, result: Result<Receipt<T>>) -> Result<Receipt<T>> {
        match &result {
            Ok(receipt) => {
                if let Some(projector) = self.projector.as_mut() {
                    projector.apply_all(&receipt.events);
                }
            }
            Err(error) => warn!(operation, %error, "operation rejected"),
        }
        result
    }

    /// See [`PoolRegistry::create_pool`].
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::create_pool`].
    pub fn create_pool(
        &mut self,
        caller: AccountId,
        owner: AccountId,
        config: PoolConfig,
    ) -> Result<Receipt<PoolId>> {
        let result = self
            .registry
            .create_pool(&caller, &self.authority, owner, &config);
        self.record("create_pool", result)
    }

    /// See [`PoolRegistry::add_liquidity`].
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::add_liquidity`].
    pub fn add_liquidity(
        &mut self,
        caller: AccountId,
        pool_id: PoolId,
        base_amount: Amount,
        quote_amount: Amount,
        min_mint_amount: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<AddLiquidityOutcome>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result = self.registry.add_liquidity(
            &mut ctx,
            pool_id,
            base_amount,
            quote_amount,
            min_mint_amount,
            keep_alive,
        );
        self.record("add_liquidity", result)
    }

    /// See [`PoolRegistry::remove_liquidity`].
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::remove_liquidity`].
    pub fn remove_liquidity(
        &mut self,
        caller: AccountId,
        pool_id: PoolId,
        lp_amount: Amount,
        min_base_amount: Amount,
        min_quote_amount: Amount,
    ) -> Result<Receipt<RemoveLiquidityOutcome>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result = self.registry.remove_liquidity(
            &mut ctx,
            pool_id,
            lp_amount,
            min_base_amount,
            min_quote_amount,
        );
        self.record("remove_liquidity", result)
    }

    /// See [`PoolRegistry::buy`].
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::buy`].
    pub fn buy(
        &mut self,
        caller: AccountId,
        pool_id: PoolId,
        asset: AssetId,
        amount: Amount,
        min_receive: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<SwapOutcome>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result = self
            .registry
            .buy(&mut ctx, pool_id, asset, amount, min_receive, keep_alive);
        self.record("buy", result)
    }

    /// See [`PoolRegistry::sell`].
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::sell`].
    pub fn sell(
        &mut self,
        caller: AccountId,
        pool_id: PoolId,
        asset: AssetId,
        amount: Amount,
        min_receive: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<SwapOutcome>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result = self
            .registry
            .sell(&mut ctx, pool_id, asset, amount, min_receive, keep_alive);
        self.record("sell", result)
    }

    /// See [`PoolRegistry::swap`].
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::swap`].
    pub fn swap(
        &mut self,
        caller: AccountId,
        pool_id: PoolId,
        pair: AssetPair,
        amount: Amount,
        min_receive: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<SwapOutcome>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result = self
            .registry
            .swap(&mut ctx, pool_id, pair, amount, min_receive, keep_alive);
        self.record("swap", result)
    }

    /// See [`PoolRegistry::delete_pool`].
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::delete_pool`].
    pub fn delete_pool(
        &mut self,
        caller: AccountId,
        pool_id: PoolId,
    ) -> Result<Receipt<(Amount, Amount)>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result = self.registry.delete_pool(&mut ctx, &self.authority, pool_id);
        self.record("delete_pool", result)
    }

    /// Spot price at the current block.
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::spot_price`].
    pub fn spot_price(&self, pool_id: PoolId, base_asset: AssetId) -> Result<Decimal> {
        self.registry
            .spot_price(pool_id, base_asset, self.clock.current_block())
    }

    /// Dry-run sell at the current block.
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::quote_sell`].
    pub fn quote_sell(&self, pool_id: PoolId, asset: AssetId, amount: Amount) -> Result<SwapQuote> {
        self.registry
            .quote_sell(pool_id, asset, amount, self.clock.current_block())
    }

    /// Dry-run buy at the current block.
    ///
    /// # Errors
    ///
    /// As [`PoolRegistry::quote_buy`].
    pub fn quote_buy(&self, pool_id: PoolId, asset: AssetId, amount: Amount) -> Result<SwapQuote> {
        self.registry
            .quote_buy(pool_id, asset, amount, self.clock.current_block())
    }

    /// See [`StakingRewardsLedger::create_reward_pool`].
    ///
    /// # Errors
    ///
    /// As [`StakingRewardsLedger::create_reward_pool`].
    pub fn create_reward_pool(
        &mut self,
        caller: AccountId,
        config: RewardPoolConfig,
    ) -> Result<Receipt<PoolId>> {
        let result = self.staking.create_reward_pool(
            &caller,
            &self.authority,
            config,
            self.clock.current_block(),
            self.clock.now(),
        );
        self.record("create_reward_pool", result)
    }

    /// See [`StakingRewardsLedger::stake`].
    ///
    /// # Errors
    ///
    /// As [`StakingRewardsLedger::stake`].
    pub fn stake(
        &mut self,
        caller: AccountId,
        pool_id: PoolId,
        amount: Amount,
        duration_preset: u64,
        keep_alive: bool,
    ) -> Result<Receipt<PositionId>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result = self
            .staking
            .stake(&mut ctx, pool_id, amount, duration_preset, keep_alive);
        self.record("stake", result)
    }

    /// See [`StakingRewardsLedger::extend`].
    ///
    /// # Errors
    ///
    /// As [`StakingRewardsLedger::extend`].
    pub fn extend(
        &mut self,
        caller: AccountId,
        position_id: PositionId,
        amount: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<Amount>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result = self.staking.extend(&mut ctx, position_id, amount, keep_alive);
        self.record("extend", result)
    }

    /// See [`StakingRewardsLedger::split`].
    ///
    /// # Errors
    ///
    /// As [`StakingRewardsLedger::split`].
    pub fn split(
        &mut self,
        caller: AccountId,
        position_id: PositionId,
        ratio: Permill,
    ) -> Result<Receipt<(PositionId, PositionId)>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result = self.staking.split(&mut ctx, position_id, ratio);
        self.record("split", result)
    }

    /// See [`StakingRewardsLedger::unstake`].
    ///
    /// # Errors
    ///
    /// As [`StakingRewardsLedger::unstake`].
    pub fn unstake(
        &mut self,
        caller: AccountId,
        position_id: PositionId,
    ) -> Result<Receipt<UnstakeOutcome>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result = self.staking.unstake(&mut ctx, position_id);
        self.record("unstake", result)
    }

    /// See [`StakingRewardsLedger::claim`].
    ///
    /// # Errors
    ///
    /// As [`StakingRewardsLedger::claim`].
    pub fn claim(
        &mut self,
        caller: AccountId,
        position_id: PositionId,
    ) -> Result<Receipt<Vec<(AssetId, Amount)>>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result = self.staking.claim(&mut ctx, position_id);
        self.record("claim", result)
    }

    /// See [`StakingRewardsLedger::update_rewards_pool`].
    ///
    /// # Errors
    ///
    /// As [`StakingRewardsLedger::update_rewards_pool`].
    pub fn update_rewards_pool(
        &mut self,
        caller: AccountId,
        pool_id: PoolId,
        reward_rates: BTreeMap<AssetId, RewardRate>,
    ) -> Result<Receipt<()>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result =
            self.staking
                .update_rewards_pool(&mut ctx, &self.authority, pool_id, reward_rates);
        self.record("update_rewards_pool", result)
    }

    /// See [`StakingRewardsLedger::add_to_rewards_pot`].
    ///
    /// # Errors
    ///
    /// As [`StakingRewardsLedger::add_to_rewards_pot`].
    pub fn add_to_rewards_pot(
        &mut self,
        caller: AccountId,
        pool_id: PoolId,
        asset: AssetId,
        amount: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<()>> {
        let mut ctx = CallContext::at(caller, &self.clock, &mut self.assets);
        let result = self
            .staking
            .add_to_rewards_pot(&mut ctx, pool_id, asset, amount, keep_alive);
        self.record("add_to_rewards_pot", result)
    }

    /// Rewards a position could claim now.
    ///
    /// # Errors
    ///
    /// As [`StakingRewardsLedger::pending_rewards`].
    pub fn pending_rewards(&self, position_id: PositionId) -> Result<Vec<(AssetId, Amount)>> {
        self.staking.pending_rewards(
            &self.assets,
            position_id,
            self.clock.current_block(),
            self.clock.now(),
        )
    }
}
