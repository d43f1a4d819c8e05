//! Liquidity provision extending [`SwapPool`].
//!
//! LP supply is owned by the registry's LP ledger, not by the pool, so every
//! quote takes the current supply as an argument.
//!
//! # Proportional Deposits
//!
//! Once a pool holds reserves, deposits keep the reserve ratio:
//!
//! ```text
//! quote_needed = ceil(base_amount × quote_reserve / base_reserve)
//! lp_minted    = min(floor(base_used × supply / base_reserve),
//!                    floor(quote_used × supply / quote_reserve))
//! ```
//!
//! The side the caller over-supplied is only partly used.  Withdrawals
//! return `floor(reserve × lp_amount / supply)` of each side.

use super::SwapPool;
use crate::domain::{
    AccountId, AddLiquidityOutcome, Amount, BlockNumber, RemoveLiquidityOutcome, Rounding,
};
use crate::error::{LedgerError, Result};
use crate::math::mul_div;

/// Pools that accept deposits and withdrawals against LP tokens.
pub trait LiquidityPool: SwapPool {
    /// LP minted for the first deposit into an empty pool.
    ///
    /// # Errors
    ///
    /// Arithmetic or solver failures.
    fn initial_lp(&self, base_amount: Amount, quote_amount: Amount) -> Result<Amount>;

    /// Rejects deposits the pool kind does not accept from `caller`.
    ///
    /// # Errors
    ///
    /// Kind-specific, e.g. [`LedgerError::MustBeOwner`].
    fn ensure_can_add(&self, _caller: &AccountId, _block: BlockNumber) -> Result<()> {
        Ok(())
    }

    /// Rejects withdrawals the pool kind does not accept from `caller`.
    ///
    /// # Errors
    ///
    /// Kind-specific, e.g. [`LedgerError::InvalidSaleState`].
    fn ensure_can_remove(&self, _caller: &AccountId, _block: BlockNumber) -> Result<()> {
        Ok(())
    }

    /// Prices a deposit of up to `base_amount` and `quote_amount`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidQuantity`] if the deposit is empty, the first
    ///   deposit lacks one side, or nothing would be minted.
    /// - Arithmetic failures.
    fn quote_add(
        &self,
        base_amount: Amount,
        quote_amount: Amount,
        lp_supply: Amount,
    ) -> Result<AddLiquidityOutcome> {
        if base_amount.is_zero() && quote_amount.is_zero() {
            return Err(LedgerError::InvalidQuantity("deposit must not be empty"));
        }
        let state = self.state();
        if state.is_empty() || lp_supply.is_zero() {
            if base_amount.is_zero() || quote_amount.is_zero() {
                return Err(LedgerError::InvalidQuantity(
                    "first deposit needs both assets",
                ));
            }
            let lp_minted = self.initial_lp(base_amount, quote_amount)?;
            if lp_minted.is_zero() {
                return Err(LedgerError::InvalidQuantity("deposit too small to mint"));
            }
            return Ok(AddLiquidityOutcome {
                lp_minted,
                base_used: base_amount,
                quote_used: quote_amount,
            });
        }

        let base_reserve = state.base_reserve().get();
        let quote_reserve = state.quote_reserve().get();
        let quote_needed = mul_div(base_amount.get(), quote_reserve, base_reserve, Rounding::Up)?;
        let (base_used, quote_used) = if quote_needed <= quote_amount.get() {
            (base_amount.get(), quote_needed)
        } else {
            let base_needed =
                mul_div(quote_amount.get(), base_reserve, quote_reserve, Rounding::Up)?;
            (base_needed, quote_amount.get())
        };

        let supply = lp_supply.get();
        let by_base = mul_div(base_used, supply, base_reserve, Rounding::Down)?;
        let by_quote = mul_div(quote_used, supply, quote_reserve, Rounding::Down)?;
        let lp_minted = by_base.min(by_quote);
        if lp_minted == 0 {
            return Err(LedgerError::InvalidQuantity("deposit too small to mint"));
        }
        Ok(AddLiquidityOutcome {
            lp_minted: Amount::new(lp_minted),
            base_used: Amount::new(base_used),
            quote_used: Amount::new(quote_used),
        })
    }

    /// Prices burning `lp_amount` out of `lp_supply`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidQuantity`] for a zero amount.
    /// - [`LedgerError::InsufficientLpBalance`] if `lp_amount` exceeds supply.
    fn quote_remove(&self, lp_amount: Amount, lp_supply: Amount) -> Result<RemoveLiquidityOutcome> {
        if lp_amount.is_zero() {
            return Err(LedgerError::InvalidQuantity("LP amount must be positive"));
        }
        if lp_amount > lp_supply {
            return Err(LedgerError::InsufficientLpBalance);
        }
        let state = self.state();
        let base_returned = mul_div(
            state.base_reserve().get(),
            lp_amount.get(),
            lp_supply.get(),
            Rounding::Down,
        )?;
        let quote_returned = mul_div(
            state.quote_reserve().get(),
            lp_amount.get(),
            lp_supply.get(),
            Rounding::Down,
        )?;
        Ok(RemoveLiquidityOutcome {
            lp_burned: lp_amount,
            base_returned: Amount::new(base_returned),
            quote_returned: Amount::new(quote_returned),
        })
    }

    /// Credits a priced deposit to the reserves.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Overflow`] if a reserve would not fit.
    fn apply_add(&mut self, outcome: &AddLiquidityOutcome) -> Result<()> {
        let pair = self.pair();
        let state = self.state_mut();
        state.credit(pair.base(), outcome.base_used)?;
        state.credit(pair.quote(), outcome.quote_used)
    }

    /// Debits a priced withdrawal from the reserves.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientLiquidity`] if a reserve is short.
    fn apply_remove(&mut self, outcome: &RemoveLiquidityOutcome) -> Result<()> {
        let pair = self.pair();
        let state = self.state_mut();
        state.debit(pair.base(), outcome.base_returned)?;
        state.debit(pair.quote(), outcome.quote_returned)
    }
}
