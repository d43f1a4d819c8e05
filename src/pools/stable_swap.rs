//! StableSwap pool for assets expected to trade near parity.
//!
//! Trades keep the invariant `D` of
//! `Ann · (x + y) + D = Ann · D + D³ / (4 · x · y)` constant.  The curve is
//! solved with bounded Newton iteration, see [`crate::math::stable_swap`].
//!
//! # Swap Algorithm (x → y)
//!
//! 1. `D = compute_d(x, y)`
//! 2. `y' = compute_y(x + net_input, D)`
//! 3. `amount_out = y − y' − 1`, one unit held back for solver rounding

use rust_decimal::Decimal;

use crate::config::StableSwapConfig;
use crate::domain::{Amount, AssetId, BlockNumber};
use crate::error::{LedgerError, Result};
use crate::math::stable_swap;
use crate::pools::PoolState;
use crate::traits::{FromConfig, LiquidityPool, PoolIdentity, SwapPool};

/// A two-asset StableSwap pool.
///
/// The first deposit mints `D` LP tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StableSwapPool {
    state: PoolState,
    amplification: u32,
}

impl StableSwapPool {
    /// Amplification coefficient `A`.
    #[must_use]
    pub const fn amplification(&self) -> u32 {
        self.amplification
    }

    /// Current invariant `D`.
    ///
    /// # Errors
    ///
    /// Solver failures from [`stable_swap::compute_d`].
    pub fn invariant(&self) -> Result<Amount> {
        stable_swap::compute_d(
            self.state.base_reserve().get(),
            self.state.quote_reserve().get(),
            u128::from(self.amplification),
        )
        .map(Amount::new)
    }
}

impl FromConfig<StableSwapConfig> for StableSwapPool {
    fn from_config(config: &StableSwapConfig, identity: PoolIdentity) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: PoolState::new(identity, config.pair(), config.fee_config()),
            amplification: config.amplification(),
        })
    }
}

impl SwapPool for StableSwapPool {
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
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(LedgerError::ZeroReserve);
        }
        let amp = u128::from(self.amplification);
        let d = stable_swap::compute_d(reserve_in.get(), reserve_out.get(), amp)?;
        let grown = reserve_in
            .get()
            .checked_add(amount_in.get())
            .ok_or(LedgerError::Overflow("input reserve"))?;
        let y = stable_swap::compute_y(grown, d, amp)?;
        let out = reserve_out
            .get()
            .checked_sub(y)
            .ok_or(LedgerError::Underflow("stable swap output"))?
            .saturating_sub(1);
        Ok(Amount::new(out))
    }

    fn curve_in_given_out(
        &self,
        asset_out: AssetId,
        amount_out: Amount,
        _block: BlockNumber,
    ) -> Result<Amount> {
        let asset_in = self.state.pair().other(asset_out)?;
        let (reserve_in, reserve_out) = self.state.reserves_for(asset_in)?;
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(LedgerError::ZeroReserve);
        }
        if amount_out >= reserve_out {
            return Err(LedgerError::InsufficientLiquidity);
        }
        let amp = u128::from(self.amplification);
        let d = stable_swap::compute_d(reserve_in.get(), reserve_out.get(), amp)?;
        let x = stable_swap::compute_y(reserve_out.get() - amount_out.get(), d, amp)?;
        let needed = x
            .checked_sub(reserve_in.get())
            .ok_or(LedgerError::Underflow("stable swap input"))?
            .checked_add(1)
            .ok_or(LedgerError::Overflow("stable swap input"))?;
        Ok(Amount::new(needed))
    }

    fn spot_price(&self, base_asset: AssetId, _block: BlockNumber) -> Result<Decimal> {
        let (reserve_base, reserve_other) = self.state.reserves_for(base_asset)?;
        stable_swap::spot_price(
            reserve_base.get(),
            reserve_other.get(),
            u128::from(self.amplification),
        )
    }
}

impl LiquidityPool for StableSwapPool {
    fn initial_lp(&self, base_amount: Amount, quote_amount: Amount) -> Result<Amount> {
        stable_swap::compute_d(
            base_amount.get(),
            quote_amount.get(),
            u128::from(self.amplification),
        )
        .map(Amount::new)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::{AccountId, AssetPair, FeeConfig};

    const BASE: AssetId = AssetId::new(1);
    const QUOTE: AssetId = AssetId::new(2);

    fn make_pool(amp: u32, fee: FeeConfig, base: u128, quote: u128) -> StableSwapPool {
        let Ok(pair) = AssetPair::new(BASE, QUOTE) else {
            panic!("distinct assets");
        };
        let Ok(cfg) = StableSwapConfig::new(pair, fee, amp) else {
            panic!("valid config");
        };
        let identity = PoolIdentity {
            owner: AccountId::from_bytes([1; 32]),
            lp_token: AssetId::new(100),
        };
        let Ok(mut pool) = StableSwapPool::from_config(&cfg, identity) else {
            panic!("valid pool");
        };
        let Ok(seed) = pool.quote_add(Amount::new(base), Amount::new(quote), Amount::ZERO) else {
            panic!("first deposit");
        };
        let Ok(()) = pool.apply_add(&seed) else {
            panic!("seeded");
        };
        pool
    }

    #[test]
    fn balanced_first_deposit_mints_sum() {
        let pool = make_pool(100, FeeConfig::ZERO, 1_000_000, 1_000_000);
        assert_eq!(pool.invariant(), Ok(Amount::new(2_000_000)));
    }

    #[test]
    fn balanced_swap_is_near_parity() {
        let pool = make_pool(100, FeeConfig::ZERO, 1_000_000_000, 1_000_000_000);
        let Ok(q) = pool.quote_exact_in(BASE, Amount::new(1_000_000), 1) else {
            panic!("priced");
        };
        assert!(q.amount_out.get() < 1_000_000);
        assert!(q.amount_out.get() > 999_000);
    }

    #[test]
    fn higher_amplification_means_less_slippage() {
        let flat = make_pool(1_000, FeeConfig::ZERO, 1_000_000, 1_000_000);
        let curved = make_pool(1, FeeConfig::ZERO, 1_000_000, 1_000_000);
        let (Ok(a), Ok(b)) = (
            flat.quote_exact_in(BASE, Amount::new(100_000), 1),
            curved.quote_exact_in(BASE, Amount::new(100_000), 1),
        ) else {
            panic!("priced");
        };
        assert!(a.amount_out > b.amount_out);
    }

    #[test]
    fn invariant_holds_after_swap() {
        let Ok(fee) = FeeConfig::new(3_000, 0, 0) else {
            panic!("valid fee");
        };
        let mut pool = make_pool(50, fee, 5_000_000, 3_000_000);
        let Ok(before) = pool.invariant() else {
            panic!("solved");
        };
        let Ok(q) = pool.quote_exact_in(QUOTE, Amount::new(400_000), 1) else {
            panic!("priced");
        };
        let Ok(()) = pool.apply_swap(&q) else {
            panic!("applied");
        };
        let Ok(after) = pool.invariant() else {
            panic!("solved");
        };
        assert!(after >= before);
    }

    #[test]
    fn in_given_out_covers_requested_output() {
        let pool = make_pool(100, FeeConfig::ZERO, 1_000_000, 1_000_000);
        let Ok(needed) = pool.curve_in_given_out(QUOTE, Amount::new(10_000), 1) else {
            panic!("priced");
        };
        let Ok(out) = pool.curve_out_given_in(BASE, needed, 1) else {
            panic!("priced");
        };
        assert!(out.get() + 2 >= 10_000);
    }

    #[test]
    fn balanced_spot_price_is_one() {
        let pool = make_pool(100, FeeConfig::ZERO, 1_000_000, 1_000_000);
        assert_eq!(pool.spot_price(BASE, 1), Ok(dec!(1)));
    }
}
