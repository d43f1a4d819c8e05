//! Priced trades and their settled outcome.

use serde::{Deserialize, Serialize};

use super::{Amount, AssetId, Fee};

/// A priced trade before settlement.
///
/// `amount_in` is the gross amount the caller pays, fee included.
/// `amount_out` is what the curve releases for `amount_in - fee.fee`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapQuote {
    /// Asset paid by the caller.
    pub asset_in: AssetId,
    /// Asset received by the caller.
    pub asset_out: AssetId,
    /// Gross amount paid, fee included.
    pub amount_in: Amount,
    /// Amount received.
    pub amount_out: Amount,
    /// Fee split, denominated in `asset_in`.
    pub fee: Fee,
}

impl SwapQuote {
    /// Amount credited to the input reserve: the input minus the fee parts
    /// that leave the pool.
    #[must_use]
    pub fn reserve_credit(&self) -> Amount {
        self.amount_in.saturating_sub(&self.fee.external())
    }
}

/// Outcome of a settled buy, sell or swap.
///
/// The base side is what the caller received and the quote side what the
/// caller paid, matching the [`Swapped`](crate::events::Event::Swapped)
/// event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapOutcome {
    /// Asset received.
    pub base_asset: AssetId,
    /// Asset paid.
    pub quote_asset: AssetId,
    /// Amount received.
    pub base_amount: Amount,
    /// Amount paid, fee included.
    pub quote_amount: Amount,
    /// Fee split in the quote asset.
    pub fee: Fee,
}

impl From<SwapQuote> for SwapOutcome {
    fn from(quote: SwapQuote) -> Self {
        Self {
            base_asset: quote.asset_out,
            quote_asset: quote.asset_in,
            base_amount: quote.amount_out,
            quote_amount: quote.amount_in,
            fee: quote.fee,
        }
    }
}
