//! Enum dispatch over every pool kind.
//!
//! [`Pool`] wraps the concrete pool types behind a single enum so the
//! registry can keep one map of pools and call them without trait objects.

use rust_decimal::Decimal;

use super::{ConstantProductPool, LiquidityBootstrappingPool, PoolState, StableSwapPool};
use crate::config::PoolKind;
use crate::domain::{AccountId, Amount, AssetId, BlockNumber};
use crate::error::Result;
use crate::traits::{LiquidityPool, SwapPool};

/// Any pool held by the registry.
///
/// Implements [`SwapPool`] and [`LiquidityPool`] by delegating every
/// required method to the inner pool; the provided methods then run on
/// top of the delegated ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pool {
    /// Weighted constant product.
    ConstantProduct(ConstantProductPool),
    /// StableSwap.
    StableSwap(StableSwapPool),
    /// Liquidity bootstrapping.
    LiquidityBootstrapping(LiquidityBootstrappingPool),
}

/// Delegates a method call to every `Pool` variant.
macro_rules! delegate {
    ($self:ident, $method:ident ( $($arg:expr),* )) => {
        match $self {
            Pool::ConstantProduct(p) => p.$method($($arg),*),
            Pool::StableSwap(p) => p.$method($($arg),*),
            Pool::LiquidityBootstrapping(p) => p.$method($($arg),*),
        }
    };
}

impl Pool {
    /// Pool family.
    #[must_use]
    pub const fn kind(&self) -> PoolKind {
        match self {
            Self::ConstantProduct(_) => PoolKind::ConstantProduct,
            Self::StableSwap(_) => PoolKind::StableSwap,
            Self::LiquidityBootstrapping(_) => PoolKind::LiquidityBootstrapping,
        }
    }
}

impl SwapPool for Pool {
    fn state(&self) -> &PoolState {
        delegate!(self, state())
    }

    fn state_mut(&mut self) -> &mut PoolState {
        delegate!(self, state_mut())
    }

    fn ensure_tradable(&self, block: BlockNumber) -> Result<()> {
        delegate!(self, ensure_tradable(block))
    }

    fn curve_out_given_in(
        &self,
        asset_in: AssetId,
        amount_in: Amount,
        block: BlockNumber,
    ) -> Result<Amount> {
        delegate!(self, curve_out_given_in(asset_in, amount_in, block))
    }

    fn curve_in_given_out(
        &self,
        asset_out: AssetId,
        amount_out: Amount,
        block: BlockNumber,
    ) -> Result<Amount> {
        delegate!(self, curve_in_given_out(asset_out, amount_out, block))
    }

    fn spot_price(&self, base_asset: AssetId, block: BlockNumber) -> Result<Decimal> {
        delegate!(self, spot_price(base_asset, block))
    }
}

impl LiquidityPool for Pool {
    fn initial_lp(&self, base_amount: Amount, quote_amount: Amount) -> Result<Amount> {
        delegate!(self, initial_lp(base_amount, quote_amount))
    }

    fn ensure_can_add(&self, caller: &AccountId, block: BlockNumber) -> Result<()> {
        delegate!(self, ensure_can_add(caller, block))
    }

    fn ensure_can_remove(&self, caller: &AccountId, block: BlockNumber) -> Result<()> {
        delegate!(self, ensure_can_remove(caller, block))
    }
}
