//! Pricing and trade execution shared by every pool kind.
//!
//! A pool kind supplies its curve through three required methods; fee
//! handling, quoting and reserve updates are provided on top.
//!
//! # Fee Deduction
//!
//! The fee is always taken from the input amount before the curve runs:
//!
//! ```text
//! fee        = floor(amount_in × fee_rate / 1_000_000)
//! net_input  = amount_in − fee
//! amount_out = curve(net_input)
//! ```
//!
//! The LP part of the fee stays in the input reserve; the owner and
//! protocol parts leave the pool.

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::{AccountId, Amount, AssetId, AssetPair, BlockNumber, FeeConfig, SwapQuote};
use crate::error::{LedgerError, Result};
use crate::math::CheckedArithmetic;
use crate::pools::PoolState;

/// Curve-driven trading on a two-asset pool.
pub trait SwapPool {
    /// Shared reserve state.
    fn state(&self) -> &PoolState;

    /// Mutable reserve state.
    fn state_mut(&mut self) -> &mut PoolState;

    /// Rejects trading outside the pool's trading window.
    ///
    /// # Errors
    ///
    /// Kind-specific, e.g. [`LedgerError::InvalidSaleState`].
    fn ensure_tradable(&self, block: BlockNumber) -> Result<()>;

    /// Output released by the curve for `amount_in` (already net of fee).
    ///
    /// # Errors
    ///
    /// [`LedgerError::ZeroReserve`], [`LedgerError::InvalidAsset`] or
    /// arithmetic failures.
    fn curve_out_given_in(
        &self,
        asset_in: AssetId,
        amount_in: Amount,
        block: BlockNumber,
    ) -> Result<Amount>;

    /// Input the curve needs to release `amount_out` of `asset_out`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientLiquidity`] if `amount_out` would drain
    /// the reserve, plus the errors of [`SwapPool::curve_out_given_in`].
    fn curve_in_given_out(
        &self,
        asset_out: AssetId,
        amount_out: Amount,
        block: BlockNumber,
    ) -> Result<Amount>;

    /// Marginal price of `base_asset` in units of the other pool asset.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidAsset`] or [`LedgerError::ZeroReserve`].
    fn spot_price(&self, base_asset: AssetId, block: BlockNumber) -> Result<Decimal>;

    /// Pool owner.
    fn owner(&self) -> &AccountId {
        self.state().owner()
    }

    /// Asset pair.
    fn pair(&self) -> AssetPair {
        self.state().pair()
    }

    /// LP token id.
    fn lp_token(&self) -> AssetId {
        self.state().lp_token()
    }

    /// Fee configuration.
    fn fee_config(&self) -> FeeConfig {
        self.state().fee_config()
    }

    /// Prices selling exactly `amount_in` of `asset_in`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidQuantity`] if `amount_in` is zero, nothing is
    ///   left after the fee, or it is too small to release anything.
    /// - Trading window and curve errors.
    fn quote_exact_in(
        &self,
        asset_in: AssetId,
        amount_in: Amount,
        block: BlockNumber,
    ) -> Result<SwapQuote> {
        if amount_in.is_zero() {
            return Err(LedgerError::InvalidQuantity("trade amount must be positive"));
        }
        self.ensure_tradable(block)?;
        let asset_out = self.pair().other(asset_in)?;
        let fee = self.fee_config().compute_fee(amount_in)?;
        let net_in = amount_in.safe_sub(&fee.fee)?;
        if net_in.is_zero() {
            return Err(LedgerError::InvalidQuantity("nothing left to trade after the fee"));
        }
        let amount_out = self.curve_out_given_in(asset_in, net_in, block)?;
        if amount_out.is_zero() {
            return Err(LedgerError::InvalidQuantity("trade too small to release output"));
        }
        debug!(
            %asset_in, %asset_out, %amount_in, %amount_out, fee = %fee.fee,
            "quoted exact-in trade"
        );
        Ok(SwapQuote {
            asset_in,
            asset_out,
            amount_in,
            amount_out,
            fee,
        })
    }

    /// Prices buying `amount` of `asset_out`.
    ///
    /// The curve input for `amount` is found without fee and then sold
    /// through [`SwapPool::quote_exact_in`], so the fee is deducted from
    /// what the caller receives: `amount_out ≈ amount − fee`.
    ///
    /// # Errors
    ///
    /// Same as [`SwapPool::quote_exact_in`] and
    /// [`SwapPool::curve_in_given_out`].
    fn quote_buy(
        &self,
        asset_out: AssetId,
        amount: Amount,
        block: BlockNumber,
    ) -> Result<SwapQuote> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidQuantity("trade amount must be positive"));
        }
        self.ensure_tradable(block)?;
        let asset_in = self.pair().other(asset_out)?;
        let amount_in = self.curve_in_given_out(asset_out, amount, block)?;
        self.quote_exact_in(asset_in, amount_in, block)
    }

    /// Moves reserves according to a quote produced by this pool.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientLiquidity`] if the output reserve cannot
    /// cover the quote.
    fn apply_swap(&mut self, quote: &SwapQuote) -> Result<()> {
        let reserve_out = self.state().reserve_of(quote.asset_out)?;
        if quote.amount_out >= reserve_out {
            return Err(LedgerError::InsufficientLiquidity);
        }
        let state = self.state_mut();
        state.debit(quote.asset_out, quote.amount_out)?;
        state.credit(quote.asset_in, quote.reserve_credit())
    }
}
