//! Weighted constant-product pool.
//!
//! The invariant is `B_base^w_base · B_quote^w_quote = k`.  With equal
//! weights this is the classic `x · y = k`.  Fees are deducted from the
//! input amount before the curve runs.
//!
//! # Swap Algorithm (base → quote)
//!
//! 1. `fee = amount_in × fee_rate / 1 000 000`
//! 2. `net_input = amount_in − fee`
//! 3. `amount_out = B_quote · (1 − (B_base / (B_base + net_input))^(w_base / w_quote))`
//! 4. `B_base += amount_in − owner_fee − protocol_fee`
//! 5. `B_quote −= amount_out`
//!
//! # Invariant
//!
//! `k_after ≥ k_before` after every swap: the LP part of the fee enters
//! the reserve without a matching output, and the curve rounds against
//! the trader.

use rust_decimal::Decimal;

use crate::config::ConstantProductConfig;
use crate::domain::{Amount, AssetId, BlockNumber, Permill};
use crate::error::Result;
use crate::math::{sqrt_product, weighted};
use crate::pools::PoolState;
use crate::traits::{FromConfig, LiquidityPool, PoolIdentity, SwapPool};

/// A weighted constant-product pool.
///
/// Created from a [`ConstantProductConfig`] via [`FromConfig`].  The first
/// deposit seeds the reserves and mints `sqrt(base · quote)` LP tokens.
///
/// # Example
///
/// ```rust
/// use dex_ledger::config::ConstantProductConfig;
/// use dex_ledger::domain::{AccountId, Amount, AssetId, AssetPair, FeeConfig};
/// use dex_ledger::pools::ConstantProductPool;
/// use dex_ledger::traits::{FromConfig, LiquidityPool, PoolIdentity, SwapPool};
///
/// let pair = AssetPair::new(AssetId::new(1), AssetId::new(2)).expect("distinct");
/// let fee = FeeConfig::new(3_000, 0, 0).expect("valid");
/// let cfg = ConstantProductConfig::balanced(pair, fee).expect("valid");
/// let identity = PoolIdentity { owner: AccountId::from_bytes([1; 32]), lp_token: AssetId::new(100) };
///
/// let mut pool = ConstantProductPool::from_config(&cfg, identity).expect("pool created");
/// let seed = pool
///     .quote_add(Amount::new(1_000_000), Amount::new(1_000_000), Amount::ZERO)
///     .expect("first deposit");
/// pool.apply_add(&seed).expect("reserves credited");
///
/// let quote = pool.quote_exact_in(AssetId::new(1), Amount::new(1_000), 1).expect("priced");
/// assert!(quote.amount_out.get() > 0);
/// assert!(quote.fee.fee.get() > 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantProductPool {
    state: PoolState,
    base_weight: Permill,
}

impl ConstantProductPool {
    /// Base asset weight.
    #[must_use]
    pub const fn base_weight(&self) -> Permill {
        self.base_weight
    }

    /// Quote asset weight.
    #[must_use]
    pub const fn quote_weight(&self) -> Permill {
        self.base_weight.complement()
    }

    /// `(weight_in, weight_out)` for a trade paying in `asset_in`.
    fn weights_for(&self, asset_in: AssetId) -> (Permill, Permill) {
        if asset_in == self.state.pair().base() {
            (self.base_weight(), self.quote_weight())
        } else {
            (self.quote_weight(), self.base_weight())
        }
    }
}

impl FromConfig<ConstantProductConfig> for ConstantProductPool {
    fn from_config(config: &ConstantProductConfig, identity: PoolIdentity) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: PoolState::new(identity, config.pair(), config.fee_config()),
            base_weight: config.base_weight(),
        })
    }
}

impl SwapPool for ConstantProductPool {
    fn state(&self) -> &PoolState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PoolState {
        &mut self.state
    }

    fn ensure_tradable(&self, _block: BlockNumber) -> Result<()> {
        Ok(())
    }

    fn curve_out_given_in(
        &self,
        asset_in: AssetId,
        amount_in: Amount,
        _block: BlockNumber,
    ) -> Result<Amount> {
        let (reserve_in, reserve_out) = self.state.reserves_for(asset_in)?;
        let (weight_in, weight_out) = self.weights_for(asset_in);
        weighted::out_given_in(
            reserve_in.get(),
            weight_in,
            reserve_out.get(),
            weight_out,
            amount_in.get(),
        )
        .map(Amount::new)
    }

    fn curve_in_given_out(
        &self,
        asset_out: AssetId,
        amount_out: Amount,
        _block: BlockNumber,
    ) -> Result<Amount> {
        let asset_in = self.state.pair().other(asset_out)?;
        let (reserve_in, reserve_out) = self.state.reserves_for(asset_in)?;
        let (weight_in, weight_out) = self.weights_for(asset_in);
        weighted::in_given_out(
            reserve_in.get(),
            weight_in,
            reserve_out.get(),
            weight_out,
            amount_out.get(),
        )
        .map(Amount::new)
    }

    fn spot_price(&self, base_asset: AssetId, _block: BlockNumber) -> Result<Decimal> {
        let (reserve_base, reserve_other) = self.state.reserves_for(base_asset)?;
        let (weight_base, weight_other) = self.weights_for(base_asset);
        weighted::spot_price(
            reserve_base.get(),
            weight_base,
            reserve_other.get(),
            weight_other,
        )
    }
}

impl LiquidityPool for ConstantProductPool {
    fn initial_lp(&self, base_amount: Amount, quote_amount: Amount) -> Result<Amount> {
        Ok(Amount::new(sqrt_product(base_amount.get(), quote_amount.get())))
    }
}
