//! Pool registry: pool ids, LP tokens and settlement of pool operations.
//!
//! # Atomicity
//!
//! Every state-changing call prices against a clone of the target pool,
//! applies the change to the clone, settles the asset legs through a
//! [`Settlement`] (which dry-runs before moving anything) and only then
//! commits the clone and the LP ledger.  A failure at any step leaves the
//! registry and the balances untouched.
//!
//! # Escrow
//!
//! Each pool's reserves are held by a derived account, see
//! [`PoolRegistry::pool_account`].

mod lp;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::{debug, info};

pub use lp::LpLedger;

use crate::config::{LedgerConfig, PoolConfig};
use crate::context::CallContext;
use crate::domain::{
    AccountId, AddLiquidityOutcome, Amount, AssetId, AssetPair, BlockNumber, PoolId,
    RemoveLiquidityOutcome, SwapOutcome, SwapQuote,
};
use crate::error::{LedgerError, Result};
use crate::events::{Event, Receipt};
use crate::factory::PoolFactory;
use crate::pools::Pool;
use crate::traits::{Action, Assets, Authority, LiquidityPool, PoolIdentity, Settlement, SwapPool};

const POOL_ACCOUNT_TAG: [u8; 4] = *b"ammp";

/// Owns every AMM pool and the LP balances minted against them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRegistry {
    pools: BTreeMap<PoolId, Pool>,
    lp: LpLedger,
    next_pool_id: PoolId,
    next_lp_token: AssetId,
    restrict_pool_creation: bool,
    treasury: AccountId,
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new(&LedgerConfig::default())
    }
}

impl PoolRegistry {
    /// Empty registry using the creation policy and treasury of `config`.
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            pools: BTreeMap::new(),
            lp: LpLedger::default(),
            next_pool_id: PoolId::FIRST,
            next_lp_token: config.first_lp_token_id,
            restrict_pool_creation: config.restrict_pool_creation,
            treasury: config.treasury,
        }
    }

    /// Account escrowing the reserves of `pool_id`.
    #[must_use]
    pub fn pool_account(pool_id: PoolId) -> AccountId {
        AccountId::derive(POOL_ACCOUNT_TAG, pool_id.get())
    }

    /// Receiver of protocol fees.
    #[must_use]
    pub const fn treasury(&self) -> AccountId {
        self.treasury
    }

    /// Looks up a pool.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PoolNotFound`].
    pub fn pool(&self, pool_id: PoolId) -> Result<&Pool> {
        self.pools.get(&pool_id).ok_or(LedgerError::PoolNotFound)
    }

    /// Ids of all live pools, ascending.
    pub fn pool_ids(&self) -> impl Iterator<Item = PoolId> + '_ {
        self.pools.keys().copied()
    }

    /// Number of live pools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Returns `true` if no pool exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// LP balance of `account` in `pool_id`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PoolNotFound`].
    pub fn lp_balance(&self, pool_id: PoolId, account: &AccountId) -> Result<Amount> {
        let pool = self.pool(pool_id)?;
        Ok(self.lp.balance_of(pool.lp_token(), account))
    }

    /// Outstanding LP supply of `pool_id`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PoolNotFound`].
    pub fn lp_total_supply(&self, pool_id: PoolId) -> Result<Amount> {
        let pool = self.pool(pool_id)?;
        Ok(self.lp.total_supply(pool.lp_token()))
    }

    /// Price of one unit of `base_asset` in the other asset of the pool.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PoolNotFound`], [`LedgerError::InvalidAsset`] or
    /// [`LedgerError::ZeroReserve`].
    pub fn spot_price(
        &self,
        pool_id: PoolId,
        base_asset: AssetId,
        block: BlockNumber,
    ) -> Result<Decimal> {
        self.pool(pool_id)?.spot_price(base_asset, block)
    }

    /// Prices selling `amount` of `asset_in` without changing state.
    ///
    /// # Errors
    ///
    /// Lookup, trading window and curve errors.
    pub fn quote_sell(
        &self,
        pool_id: PoolId,
        asset_in: AssetId,
        amount: Amount,
        block: BlockNumber,
    ) -> Result<SwapQuote> {
        self.pool(pool_id)?.quote_exact_in(asset_in, amount, block)
    }

    /// Prices buying `amount` of `asset_out` without changing state.
    ///
    /// # Errors
    ///
    /// Lookup, trading window and curve errors.
    pub fn quote_buy(
        &self,
        pool_id: PoolId,
        asset_out: AssetId,
        amount: Amount,
        block: BlockNumber,
    ) -> Result<SwapQuote> {
        self.pool(pool_id)?.quote_buy(asset_out, amount, block)
    }

    /// Creates an empty pool owned by `owner`.
    ///
    /// Liquidity bootstrapping pools, and every pool when creation is
    /// restricted, need a caller authorized for [`Action::CreatePool`].
    /// Otherwise anyone may create a pool they own themselves.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if the caller lacks the role.
    /// - [`LedgerError::InvalidConfiguration`] for a malformed config.
    /// - [`LedgerError::Overflow`] if ids are exhausted.
    pub fn create_pool<Z: Authority + ?Sized>(
        &mut self,
        caller: &AccountId,
        authority: &Z,
        owner: AccountId,
        config: &PoolConfig,
    ) -> Result<Receipt<PoolId>> {
        let privileged = self.restrict_pool_creation || config.is_privileged() || *caller != owner;
        if privileged && !authority.is_authorized(caller, Action::CreatePool) {
            return Err(LedgerError::Unauthorized);
        }

        let pool_id = self.next_pool_id;
        let lp_token = self.next_lp_token;
        let next_pool_id = pool_id.next().ok_or(LedgerError::Overflow("pool id"))?;
        let next_lp_token = lp_token.next().ok_or(LedgerError::Overflow("LP token id"))?;
        let pool = PoolFactory::create(config, PoolIdentity { owner, lp_token })?;
        let kind = pool.kind();
        let pair = pool.pair();

        self.pools.insert(pool_id, pool);
        self.next_pool_id = next_pool_id;
        self.next_lp_token = next_lp_token;
        info!(%pool_id, %owner, %pair, %kind, %lp_token, "pool created");
        Ok(Receipt::new(
            pool_id,
            Event::PoolCreated {
                pool_id,
                owner,
                pair,
                kind,
                lp_token,
            },
        ))
    }

    /// Deposits up to `base_amount` and `quote_amount` into `pool_id`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::PoolNotFound`].
    /// - [`LedgerError::MustBeOwner`] for a foreign deposit into a
    ///   liquidity bootstrapping pool.
    /// - [`LedgerError::SlippageExceeded`] if fewer than `min_mint_amount`
    ///   LP tokens would be minted.
    /// - Balance errors from settlement.
    pub fn add_liquidity<A: Assets + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        pool_id: PoolId,
        base_amount: Amount,
        quote_amount: Amount,
        min_mint_amount: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<AddLiquidityOutcome>> {
        let pool = self.pool(pool_id)?;
        pool.ensure_can_add(&ctx.caller, ctx.block)?;
        let lp_token = pool.lp_token();
        let pair = pool.pair();
        let outcome = pool.quote_add(base_amount, quote_amount, self.lp.total_supply(lp_token))?;
        if outcome.lp_minted < min_mint_amount {
            return Err(LedgerError::SlippageExceeded("minted LP below minimum"));
        }
        let mut updated = pool.clone();
        updated.apply_add(&outcome)?;
        self.lp.can_mint(lp_token, &ctx.caller, outcome.lp_minted)?;

        let escrow = Self::pool_account(pool_id);
        Settlement::new()
            .transfer(pair.base(), ctx.caller, escrow, outcome.base_used, keep_alive)
            .transfer(pair.quote(), ctx.caller, escrow, outcome.quote_used, keep_alive)
            .execute(&mut *ctx.assets)?;
        self.lp.mint(lp_token, &ctx.caller, outcome.lp_minted)?;
        self.pools.insert(pool_id, updated);

        info!(
            %pool_id, account = %ctx.caller,
            base = %outcome.base_used, quote = %outcome.quote_used, minted = %outcome.lp_minted,
            "liquidity added"
        );
        Ok(Receipt::new(
            outcome,
            Event::LiquidityAdded {
                account: ctx.caller,
                pool_id,
                base_amount: outcome.base_used,
                quote_amount: outcome.quote_used,
                minted_lp: outcome.lp_minted,
            },
        ))
    }

    /// Burns `lp_amount` of the caller's LP tokens for a proportional share
    /// of the reserves.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::PoolNotFound`].
    /// - [`LedgerError::InsufficientLpBalance`] if the caller holds less.
    /// - [`LedgerError::SlippageExceeded`] if either side misses its minimum.
    /// - Kind-specific rejections such as a locked sale.
    pub fn remove_liquidity<A: Assets + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        pool_id: PoolId,
        lp_amount: Amount,
        min_base_amount: Amount,
        min_quote_amount: Amount,
    ) -> Result<Receipt<RemoveLiquidityOutcome>> {
        let pool = self.pool(pool_id)?;
        pool.ensure_can_remove(&ctx.caller, ctx.block)?;
        let lp_token = pool.lp_token();
        let pair = pool.pair();
        if self.lp.balance_of(lp_token, &ctx.caller) < lp_amount {
            return Err(LedgerError::InsufficientLpBalance);
        }
        let outcome = pool.quote_remove(lp_amount, self.lp.total_supply(lp_token))?;
        if outcome.base_returned < min_base_amount {
            return Err(LedgerError::SlippageExceeded("base returned below minimum"));
        }
        if outcome.quote_returned < min_quote_amount {
            return Err(LedgerError::SlippageExceeded("quote returned below minimum"));
        }
        let mut updated = pool.clone();
        updated.apply_remove(&outcome)?;

        let escrow = Self::pool_account(pool_id);
        Settlement::new()
            .transfer(pair.base(), escrow, ctx.caller, outcome.base_returned, false)
            .transfer(pair.quote(), escrow, ctx.caller, outcome.quote_returned, false)
            .execute(&mut *ctx.assets)?;
        self.lp.burn(lp_token, &ctx.caller, lp_amount)?;
        self.pools.insert(pool_id, updated);

        info!(
            %pool_id, account = %ctx.caller,
            base = %outcome.base_returned, quote = %outcome.quote_returned, burned = %lp_amount,
            "liquidity removed"
        );
        Ok(Receipt::new(
            outcome,
            Event::LiquidityRemoved {
                account: ctx.caller,
                pool_id,
                base_amount: outcome.base_returned,
                quote_amount: outcome.quote_returned,
                burned_lp: lp_amount,
            },
        ))
    }

    /// Sells exactly `amount` of `asset`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::SlippageExceeded`] if less than `min_receive` would
    ///   be received.
    /// - Lookup, trading window, curve and balance errors.
    pub fn sell<A: Assets + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        pool_id: PoolId,
        asset: AssetId,
        amount: Amount,
        min_receive: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<SwapOutcome>> {
        let quote = self.quote_sell(pool_id, asset, amount, ctx.block)?;
        self.execute_trade(ctx, pool_id, &quote, min_receive, keep_alive)
    }

    /// Buys `amount` of `asset`, fee taken from what is received.
    ///
    /// # Errors
    ///
    /// Same as [`PoolRegistry::sell`].
    pub fn buy<A: Assets + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        pool_id: PoolId,
        asset: AssetId,
        amount: Amount,
        min_receive: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<SwapOutcome>> {
        let quote = self.quote_buy(pool_id, asset, amount, ctx.block)?;
        self.execute_trade(ctx, pool_id, &quote, min_receive, keep_alive)
    }

    /// Pays `amount` of `pair.quote()` for `pair.base()`.
    ///
    /// `pair` may be given in either orientation relative to the pool.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAsset`] if `pair` is not the pool's pair.
    /// - Same as [`PoolRegistry::sell`].
    pub fn swap<A: Assets + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        pool_id: PoolId,
        pair: AssetPair,
        amount: Amount,
        min_receive: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<SwapOutcome>> {
        if !self.pool(pool_id)?.pair().same_assets(&pair) {
            return Err(LedgerError::InvalidAsset("pair does not match the pool"));
        }
        self.sell(ctx, pool_id, pair.quote(), amount, min_receive, keep_alive)
    }

    fn execute_trade<A: Assets + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        pool_id: PoolId,
        quote: &SwapQuote,
        min_receive: Amount,
        keep_alive: bool,
    ) -> Result<Receipt<SwapOutcome>> {
        if quote.amount_out < min_receive {
            return Err(LedgerError::SlippageExceeded("received amount below minimum"));
        }
        let pool = self.pool(pool_id)?;
        let owner = *pool.owner();
        // Fee parts a receiver cannot hold stay in the reserves.
        let mut quote = *quote;
        if !ctx.assets.can_deposit(quote.asset_in, &owner, quote.fee.owner_fee) {
            quote.fee.owner_fee = Amount::ZERO;
        }
        if !ctx.assets.can_deposit(quote.asset_in, &self.treasury, quote.fee.protocol_fee) {
            quote.fee.protocol_fee = Amount::ZERO;
        }
        let mut updated = pool.clone();
        updated.apply_swap(&quote)?;

        let escrow = Self::pool_account(pool_id);
        let caller = ctx.caller;
        Settlement::new()
            .transfer(quote.asset_in, caller, escrow, quote.reserve_credit(), keep_alive)
            .transfer(quote.asset_in, caller, owner, quote.fee.owner_fee, keep_alive)
            .transfer(quote.asset_in, caller, self.treasury, quote.fee.protocol_fee, keep_alive)
            .transfer(quote.asset_out, escrow, caller, quote.amount_out, false)
            .execute(&mut *ctx.assets)?;
        self.pools.insert(pool_id, updated);

        let outcome = SwapOutcome::from(quote);
        info!(
            %pool_id, account = %caller,
            paid = %outcome.quote_amount, received = %outcome.base_amount, fee = %outcome.fee.fee,
            "swapped"
        );
        Ok(Receipt::new(
            outcome,
            Event::Swapped {
                pool_id,
                account: caller,
                base_asset: outcome.base_asset,
                quote_asset: outcome.quote_asset,
                base_amount: outcome.base_amount,
                quote_amount: outcome.quote_amount,
                fee: outcome.fee,
            },
        ))
    }

    /// Deletes a pool with no LP tokens in circulation and returns any
    /// residual reserves to its owner.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::PoolNotFound`].
    /// - [`LedgerError::MustBeOwner`] unless the caller owns the pool or is
    ///   authorized for [`Action::DeletePool`].
    /// - [`LedgerError::LiquidityOutstanding`] while LP supply is positive.
    pub fn delete_pool<A: Assets + ?Sized, Z: Authority + ?Sized>(
        &mut self,
        ctx: &mut CallContext<'_, A>,
        authority: &Z,
        pool_id: PoolId,
    ) -> Result<Receipt<(Amount, Amount)>> {
        let pool = self.pool(pool_id)?;
        let owner = *pool.owner();
        if ctx.caller != owner && !authority.is_authorized(&ctx.caller, Action::DeletePool) {
            return Err(LedgerError::MustBeOwner);
        }
        if !self.lp.total_supply(pool.lp_token()).is_zero() {
            return Err(LedgerError::LiquidityOutstanding);
        }
        let pair = pool.pair();
        let base_amount = pool.state().base_reserve();
        let quote_amount = pool.state().quote_reserve();

        let escrow = Self::pool_account(pool_id);
        Settlement::new()
            .transfer(pair.base(), escrow, owner, base_amount, false)
            .transfer(pair.quote(), escrow, owner, quote_amount, false)
            .execute(&mut *ctx.assets)?;
        self.pools.remove(&pool_id);

        info!(%pool_id, base = %base_amount, quote = %quote_amount, "pool deleted");
        Ok(Receipt::new(
            (base_amount, quote_amount),
            Event::PoolDeleted {
                pool_id,
                base_amount,
                quote_amount,
            },
        ))
    }

    /// Reserves held in escrow for `pool_id`, read from the asset ledger.
    ///
    /// Equal to the pool's recorded reserves at every commit point.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PoolNotFound`].
    pub fn escrowed<A: Assets + ?Sized>(&self, assets: &A, pool_id: PoolId) -> Result<(Amount, Amount)> {
        let pair = self.pool(pool_id)?.pair();
        let escrow = Self::pool_account(pool_id);
        let held = (
            assets.balance(pair.base(), &escrow),
            assets.balance(pair.quote(), &escrow),
        );
        debug!(%pool_id, base = %held.0, quote = %held.1, "escrow balances");
        Ok(held)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::{ConstantProductConfig, LiquidityBootstrappingConfig, StableSwapConfig};
    use crate::domain::{FeeConfig, Permill, Sale};
    use crate::env::{InMemoryAssets, PolicyAuthority};

    const BASE: AssetId = AssetId::new(1);
    const QUOTE: AssetId = AssetId::new(2);
    const SEED: u128 = 1_000_000_000_000;

    fn alice() -> AccountId {
        AccountId::from_bytes([0xa1; 32])
    }

    fn bob() -> AccountId {
        AccountId::from_bytes([0xb0; 32])
    }

    fn manager() -> AccountId {
        AccountId::from_bytes([0x77; 32])
    }

    fn pair() -> AssetPair {
        let Ok(p) = AssetPair::new(BASE, QUOTE) else {
            panic!("distinct assets");
        };
        p
    }

    fn cp_config(fee_rate: u32, owner: u32, protocol: u32) -> PoolConfig {
        let Ok(fee) = FeeConfig::new(fee_rate, owner, protocol) else {
            panic!("valid fee");
        };
        let Ok(cfg) = ConstantProductConfig::balanced(pair(), fee) else {
            panic!("valid config");
        };
        PoolConfig::ConstantProduct(cfg)
    }

    fn funded() -> InMemoryAssets {
        let mut assets = InMemoryAssets::new(Amount::new(1));
        for account in [alice(), bob()] {
            for asset in [BASE, QUOTE] {
                let Ok(()) = assets.mint(asset, &account, Amount::new(10 * SEED)) else {
                    panic!("minted");
                };
            }
        }
        assets
    }

    struct Fixture {
        registry: PoolRegistry,
        assets: InMemoryAssets,
        authority: PolicyAuthority,
        pool_id: PoolId,
    }

    fn seeded(config: PoolConfig) -> Fixture {
        let mut registry = PoolRegistry::default();
        let mut assets = funded();
        let authority = PolicyAuthority::new([manager()]);
        let Ok(created) = registry.create_pool(&alice(), &authority, alice(), &config) else {
            panic!("pool created");
        };
        let pool_id = created.outcome;
        let mut ctx = CallContext::new(alice(), 1, 0, &mut assets);
        let Ok(_) = registry.add_liquidity(
            &mut ctx,
            pool_id,
            Amount::new(SEED),
            Amount::new(SEED),
            Amount::ZERO,
            true,
        ) else {
            panic!("seeded");
        };
        Fixture {
            registry,
            assets,
            authority,
            pool_id,
        }
    }

    #[test]
    fn create_assigns_sequential_ids_and_lp_tokens() {
        let mut registry = PoolRegistry::default();
        let authority = PolicyAuthority::default();
        let (Ok(first), Ok(second)) = (
            registry.create_pool(&alice(), &authority, alice(), &cp_config(3_000, 0, 0)),
            registry.create_pool(&bob(), &authority, bob(), &cp_config(3_000, 0, 0)),
        ) else {
            panic!("pools created");
        };
        assert_eq!(first.outcome, PoolId::new(1));
        assert_eq!(second.outcome, PoolId::new(2));
        let (Ok(p1), Ok(p2)) = (registry.pool(first.outcome), registry.pool(second.outcome)) else {
            panic!("pools exist");
        };
        assert_ne!(p1.lp_token(), p2.lp_token());
        assert!(matches!(first.events[0], Event::PoolCreated { .. }));
    }

    #[test]
    fn restricted_creation_needs_authority() {
        let config = LedgerConfig {
            restrict_pool_creation: true,
            ..LedgerConfig::default()
        };
        let mut registry = PoolRegistry::new(&config);
        let authority = PolicyAuthority::new([manager()]);
        assert_eq!(
            registry.create_pool(&alice(), &authority, alice(), &cp_config(3_000, 0, 0)),
            Err(LedgerError::Unauthorized)
        );
        assert!(registry.is_empty());
        assert!(registry
            .create_pool(&manager(), &authority, alice(), &cp_config(3_000, 0, 0))
            .is_ok());
    }

    #[test]
    fn creating_for_someone_else_needs_authority() {
        let mut registry = PoolRegistry::default();
        let authority = PolicyAuthority::default();
        assert_eq!(
            registry.create_pool(&alice(), &authority, bob(), &cp_config(3_000, 0, 0)),
            Err(LedgerError::Unauthorized)
        );
    }

    #[test]
    fn first_deposit_seeds_reserves_and_escrow() {
        let fx = seeded(cp_config(3_000, 0, 0));
        let Ok(pool) = fx.registry.pool(fx.pool_id) else {
            panic!("pool exists");
        };
        assert_eq!(pool.state().base_reserve(), Amount::new(SEED));
        assert_eq!(fx.registry.lp_total_supply(fx.pool_id), Ok(Amount::new(SEED)));
        assert_eq!(fx.registry.lp_balance(fx.pool_id, &alice()), Ok(Amount::new(SEED)));
        assert_eq!(
            fx.registry.escrowed(&fx.assets, fx.pool_id),
            Ok((Amount::new(SEED), Amount::new(SEED)))
        );
    }

    #[test]
    fn lopsided_stable_deposit_is_rejected() {
        let Ok(cfg) = StableSwapConfig::new(pair(), FeeConfig::ZERO, 100) else {
            panic!("valid config");
        };
        let mut registry = PoolRegistry::default();
        let mut assets = funded();
        let Ok(()) = assets.mint(QUOTE, &alice(), Amount::new(1_000_000_000_000_000_000_000_000_000_000)) else {
            panic!("minted");
        };
        let authority = PolicyAuthority::default();
        let Ok(created) = registry.create_pool(&alice(), &authority, alice(), &PoolConfig::StableSwap(cfg)) else {
            panic!("pool created");
        };
        let pool_id = created.outcome;
        let before = assets.balance(QUOTE, &alice());
        let mut ctx = CallContext::new(alice(), 1, 0, &mut assets);
        assert!(matches!(
            registry.add_liquidity(
                &mut ctx,
                pool_id,
                Amount::new(1),
                Amount::new(1_000_000_000_000_000_000_000_000_000_000),
                Amount::ZERO,
                true,
            ),
            Err(LedgerError::Overflow(_))
        ));
        assert_eq!(registry.lp_total_supply(pool_id), Ok(Amount::ZERO));
        assert_eq!(registry.escrowed(&assets, pool_id), Ok((Amount::ZERO, Amount::ZERO)));
        assert_eq!(assets.balance(QUOTE, &alice()), before);
    }

    #[test]
    fn add_then_remove_returns_deposit() {
        let mut fx = seeded(cp_config(3_000, 0, 0));
        let before = fx.assets.balance(BASE, &bob());
        let mut ctx = CallContext::new(bob(), 1, 0, &mut fx.assets);
        let Ok(added) = fx.registry.add_liquidity(
            &mut ctx,
            fx.pool_id,
            Amount::new(5_000_000),
            Amount::new(9_000_000),
            Amount::ZERO,
            true,
        ) else {
            panic!("added");
        };
        assert_eq!(added.outcome.quote_used, Amount::new(5_000_000));
        let Ok(removed) = fx.registry.remove_liquidity(
            &mut ctx,
            fx.pool_id,
            added.outcome.lp_minted,
            Amount::ZERO,
            Amount::ZERO,
        ) else {
            panic!("removed");
        };
        assert_eq!(removed.outcome.base_returned, Amount::new(5_000_000));
        assert_eq!(fx.assets.balance(BASE, &bob()), before);
        assert_eq!(fx.registry.lp_balance(fx.pool_id, &bob()), Ok(Amount::ZERO));
    }

    #[test]
    fn mint_slippage_leaves_state_untouched() {
        let mut fx = seeded(cp_config(3_000, 0, 0));
        let snapshot = fx.registry.clone();
        let balances = fx.assets.clone();
        let mut ctx = CallContext::new(bob(), 1, 0, &mut fx.assets);
        let result = fx.registry.add_liquidity(
            &mut ctx,
            fx.pool_id,
            Amount::new(1_000),
            Amount::new(1_000),
            Amount::new(1_001),
            true,
        );
        assert!(matches!(result, Err(LedgerError::SlippageExceeded(_))));
        assert_eq!(fx.registry, snapshot);
        assert_eq!(fx.assets, balances);
    }

    #[test]
    fn remove_more_than_held_fails() {
        let mut fx = seeded(cp_config(3_000, 0, 0));
        let mut ctx = CallContext::new(bob(), 1, 0, &mut fx.assets);
        assert_eq!(
            fx.registry
                .remove_liquidity(&mut ctx, fx.pool_id, Amount::new(1), Amount::ZERO, Amount::ZERO)
                .map(|r| r.outcome),
            Err(LedgerError::InsufficientLpBalance)
        );
    }

    #[test]
    fn sell_charges_fee_and_pays_fee_receivers() {
        let mut fx = seeded(cp_config(150_000, 20_000, 100_000));
        let treasury = fx.registry.treasury();
        let alice_quote = fx.assets.balance(QUOTE, &alice());
        let mut ctx = CallContext::new(bob(), 1, 0, &mut fx.assets);
        let Ok(receipt) = fx.registry.sell(
            &mut ctx,
            fx.pool_id,
            QUOTE,
            Amount::new(1_000_000),
            Amount::ZERO,
            true,
        ) else {
            panic!("sold");
        };
        let out = receipt.outcome;
        assert_eq!(out.base_asset, BASE);
        assert_eq!(out.quote_amount, Amount::new(1_000_000));
        assert_eq!(out.fee.fee, Amount::new(150_000));
        // 850_000 net into a 1e12/1e12 pool.
        assert_eq!(out.base_amount, Amount::new(849_999));
        assert_eq!(fx.assets.balance(QUOTE, &alice()), alice_quote.saturating_add(&Amount::new(3_000)));
        assert_eq!(fx.assets.balance(QUOTE, &treasury), Amount::new(15_000));
        let Ok(pool) = fx.registry.pool(fx.pool_id) else {
            panic!("pool exists");
        };
        assert_eq!(
            fx.registry.escrowed(&fx.assets, fx.pool_id),
            Ok((pool.state().base_reserve(), pool.state().quote_reserve()))
        );
    }

    #[test]
    fn fee_below_minimum_balance_stays_in_pool() {
        let mut registry = PoolRegistry::default();
        let mut assets = InMemoryAssets::new(Amount::new(1_000));
        for account in [alice(), bob()] {
            for asset in [BASE, QUOTE] {
                let Ok(()) = assets.mint(asset, &account, Amount::new(10 * SEED)) else {
                    panic!("minted");
                };
            }
        }
        let authority = PolicyAuthority::default();
        let Ok(created) = registry.create_pool(&alice(), &authority, alice(), &cp_config(3_000, 0, 100_000)) else {
            panic!("pool created");
        };
        let pool_id = created.outcome;
        let mut ctx = CallContext::new(alice(), 1, 0, &mut assets);
        let Ok(_) = registry.add_liquidity(&mut ctx, pool_id, Amount::new(SEED), Amount::new(SEED), Amount::ZERO, true)
        else {
            panic!("seeded");
        };
        let treasury = registry.treasury();
        let mut ctx = CallContext::new(bob(), 1, 0, &mut assets);
        // 3_000 fee, 300 of it for the empty treasury.
        let Ok(receipt) = registry.sell(&mut ctx, pool_id, QUOTE, Amount::new(1_000_000), Amount::ZERO, true) else {
            panic!("sold");
        };
        assert_eq!(receipt.outcome.fee.fee, Amount::new(3_000));
        assert_eq!(receipt.outcome.fee.protocol_fee, Amount::ZERO);
        assert_eq!(assets.balance(QUOTE, &treasury), Amount::ZERO);
        let Ok(pool) = registry.pool(pool_id) else {
            panic!("pool exists");
        };
        assert_eq!(pool.state().quote_reserve(), Amount::new(SEED + 1_000_000));
        assert_eq!(
            registry.escrowed(&assets, pool_id),
            Ok((pool.state().base_reserve(), pool.state().quote_reserve()))
        );
    }

    #[test]
    fn full_fee_pool_refuses_trades() {
        let mut fx = seeded(cp_config(1_000_000, 0, 0));
        let before = fx.assets.balance(QUOTE, &bob());
        let mut ctx = CallContext::new(bob(), 1, 0, &mut fx.assets);
        assert!(matches!(
            fx.registry.sell(&mut ctx, fx.pool_id, QUOTE, Amount::new(1_000_000), Amount::ZERO, true),
            Err(LedgerError::InvalidQuantity(_))
        ));
        assert_eq!(fx.assets.balance(QUOTE, &bob()), before);
    }

    #[test]
    fn buy_receives_amount_minus_fee() {
        let mut fx = seeded(cp_config(150_000, 0, 0));
        let mut ctx = CallContext::new(bob(), 1, 0, &mut fx.assets);
        let Ok(receipt) = fx.registry.buy(
            &mut ctx,
            fx.pool_id,
            BASE,
            Amount::new(1_000_000),
            Amount::ZERO,
            true,
        ) else {
            panic!("bought");
        };
        let out = receipt.outcome;
        let expected = 850_000u128;
        assert!(out.base_amount.get().abs_diff(expected) <= expected / 100);
        assert!(out.fee.fee.get().abs_diff(150_000) <= 1_500);
    }

    #[test]
    fn swap_checks_pair_and_slippage() {
        let mut fx = seeded(cp_config(3_000, 0, 0));
        let Ok(foreign) = AssetPair::new(BASE, AssetId::new(9)) else {
            panic!("distinct assets");
        };
        let mut ctx = CallContext::new(bob(), 1, 0, &mut fx.assets);
        assert!(matches!(
            fx.registry.swap(&mut ctx, fx.pool_id, foreign, Amount::new(1_000), Amount::ZERO, true),
            Err(LedgerError::InvalidAsset(_))
        ));
        assert!(matches!(
            fx.registry.swap(
                &mut ctx,
                fx.pool_id,
                pair().swap(),
                Amount::new(1_000),
                Amount::new(1_000),
                true
            ),
            Err(LedgerError::SlippageExceeded(_))
        ));
        let Ok(receipt) = fx.registry.swap(
            &mut ctx,
            fx.pool_id,
            pair().swap(),
            Amount::new(1_000),
            Amount::ZERO,
            true,
        ) else {
            panic!("swapped");
        };
        // pair().swap() pays BASE for QUOTE.
        assert_eq!(receipt.outcome.quote_asset, BASE);
        assert_eq!(receipt.outcome.base_asset, QUOTE);
    }

    #[test]
    fn trade_without_funds_is_atomic() {
        let mut fx = seeded(cp_config(3_000, 0, 0));
        let snapshot = fx.registry.clone();
        let pauper = AccountId::from_bytes([0x99; 32]);
        let mut ctx = CallContext::new(pauper, 1, 0, &mut fx.assets);
        assert_eq!(
            fx.registry
                .sell(&mut ctx, fx.pool_id, BASE, Amount::new(1_000), Amount::ZERO, false)
                .map(|r| r.outcome),
            Err(LedgerError::InsufficientBalance)
        );
        assert_eq!(fx.registry, snapshot);
    }

    #[test]
    fn spot_price_of_balanced_pool_is_one() {
        let fx = seeded(cp_config(3_000, 0, 0));
        assert_eq!(fx.registry.spot_price(fx.pool_id, BASE, 1), Ok(dec!(1)));
    }

    #[test]
    fn delete_requires_empty_supply_and_returns_residue() {
        let mut fx = seeded(cp_config(3_000, 0, 0));
        let mut ctx = CallContext::new(bob(), 1, 0, &mut fx.assets);
        assert_eq!(
            fx.registry
                .delete_pool(&mut ctx, &fx.authority, fx.pool_id)
                .map(|r| r.outcome),
            Err(LedgerError::MustBeOwner)
        );
        let mut ctx = CallContext::new(alice(), 1, 0, &mut fx.assets);
        assert_eq!(
            fx.registry
                .delete_pool(&mut ctx, &fx.authority, fx.pool_id)
                .map(|r| r.outcome),
            Err(LedgerError::LiquidityOutstanding)
        );
        let Ok(_) = fx.registry.remove_liquidity(
            &mut ctx,
            fx.pool_id,
            Amount::new(SEED),
            Amount::ZERO,
            Amount::ZERO,
        ) else {
            panic!("removed");
        };
        let Ok(deleted) = fx.registry.delete_pool(&mut ctx, &fx.authority, fx.pool_id) else {
            panic!("deleted");
        };
        assert_eq!(deleted.outcome, (Amount::ZERO, Amount::ZERO));
        assert_eq!(fx.registry.pool(fx.pool_id).map(|_| ()), Err(LedgerError::PoolNotFound));
        assert_eq!(fx.assets.balance(BASE, &alice()), Amount::new(10 * SEED));
    }

    #[test]
    fn bootstrapping_pool_is_owner_funded() {
        let (Ok(initial), Ok(last)) = (Permill::new(900_000), Permill::new(500_000)) else {
            panic!("valid weights");
        };
        let Ok(sale) = Sale::new(10, 110, initial, last) else {
            panic!("valid sale");
        };
        let Ok(cfg) = LiquidityBootstrappingConfig::new(pair(), FeeConfig::ZERO, sale) else {
            panic!("valid config");
        };
        let config = PoolConfig::LiquidityBootstrapping(cfg);
        let mut registry = PoolRegistry::default();
        let mut assets = funded();
        let authority = PolicyAuthority::new([manager()]);
        assert_eq!(
            registry.create_pool(&alice(), &authority, alice(), &config),
            Err(LedgerError::Unauthorized)
        );
        let Ok(created) = registry.create_pool(&manager(), &authority, alice(), &config) else {
            panic!("created by manager");
        };
        let mut ctx = CallContext::new(bob(), 1, 0, &mut assets);
        assert_eq!(
            registry
                .add_liquidity(&mut ctx, created.outcome, Amount::new(100), Amount::new(100), Amount::ZERO, true)
                .map(|r| r.outcome),
            Err(LedgerError::MustBeOwner)
        );
        let mut ctx = CallContext::new(alice(), 1, 0, &mut assets);
        assert!(registry
            .add_liquidity(&mut ctx, created.outcome, Amount::new(SEED), Amount::new(SEED), Amount::ZERO, true)
            .is_ok());
        assert!(matches!(
            registry.sell(&mut ctx, created.outcome, BASE, Amount::new(1_000), Amount::ZERO, true),
            Err(LedgerError::InvalidSaleState(_))
        ));
    }
}
