//! Liquidity bootstrapping pool.
//!
//! A weighted constant-product pool whose base weight follows the
//! [`Sale`](crate::domain::Sale) schedule.  Only the owner provides
//! liquidity; trading is open while the sale is ongoing, and liquidity
//! stays locked until the sale ends.

use rust_decimal::Decimal;

use crate::config::LiquidityBootstrappingConfig;
use crate::domain::{AccountId, Amount, AssetId, BlockNumber, Permill, Sale, SaleState};
use crate::error::{LedgerError, Result};
use crate::math::{sqrt_product, weighted};
use crate::pools::PoolState;
use crate::traits::{FromConfig, LiquidityPool, PoolIdentity, SwapPool};

/// A liquidity bootstrapping pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityBootstrappingPool {
    state: PoolState,
    sale: Sale,
}

impl LiquidityBootstrappingPool {
    /// Sale schedule.
    #[must_use]
    pub const fn sale(&self) -> Sale {
        self.sale
    }

    /// `(weight_in, weight_out)` at `block` for a trade paying in `asset_in`.
    fn weights_for(&self, asset_in: AssetId, block: BlockNumber) -> Result<(Permill, Permill)> {
        let base_weight = self.sale.weight_at(block)?;
        if asset_in == self.state.pair().base() {
            Ok((base_weight, base_weight.complement()))
        } else {
            Ok((base_weight.complement(), base_weight))
        }
    }
}

impl FromConfig<LiquidityBootstrappingConfig> for LiquidityBootstrappingPool {
    fn from_config(config: &LiquidityBootstrappingConfig, identity: PoolIdentity) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: PoolState::new(identity, config.pair(), config.fee_config()),
            sale: config.sale(),
        })
    }
}

impl SwapPool for LiquidityBootstrappingPool {
    fn state(&self) -> &PoolState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PoolState {
        &mut self.state
    }

    fn ensure_tradable(&self, block: BlockNumber) -> Result<()> {
        match self.sale.state(block) {
            SaleState::Ongoing => Ok(()),
            SaleState::NotStarted => Err(LedgerError::InvalidSaleState("sale has not started")),
            SaleState::Ended => Err(LedgerError::InvalidSaleState("sale has ended")),
        }
    }

    fn curve_out_given_in(
        &self,
        asset_in: AssetId,
        amount_in: Amount,
        block: BlockNumber,
    ) -> Result<Amount> {
        let (reserve_in, reserve_out) = self.state.reserves_for(asset_in)?;
        let (weight_in, weight_out) = self.weights_for(asset_in, block)?;
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
        block: BlockNumber,
    ) -> Result<Amount> {
        let asset_in = self.state.pair().other(asset_out)?;
        let (reserve_in, reserve_out) = self.state.reserves_for(asset_in)?;
        let (weight_in, weight_out) = self.weights_for(asset_in, block)?;
        weighted::in_given_out(
            reserve_in.get(),
            weight_in,
            reserve_out.get(),
            weight_out,
            amount_out.get(),
        )
        .map(Amount::new)
    }

    fn spot_price(&self, base_asset: AssetId, block: BlockNumber) -> Result<Decimal> {
        let (reserve_base, reserve_other) = self.state.reserves_for(base_asset)?;
        let (weight_base, weight_other) = self.weights_for(base_asset, block)?;
        weighted::spot_price(
            reserve_base.get(),
            weight_base,
            reserve_other.get(),
            weight_other,
        )
    }
}

impl LiquidityPool for LiquidityBootstrappingPool {
    fn initial_lp(&self, base_amount: Amount, quote_amount: Amount) -> Result<Amount> {
        Ok(Amount::new(sqrt_product(base_amount.get(), quote_amount.get())))
    }

    fn ensure_can_add(&self, caller: &AccountId, _block: BlockNumber) -> Result<()> {
        if caller != self.state.owner() {
            return Err(LedgerError::MustBeOwner);
        }
        Ok(())
    }

    fn ensure_can_remove(&self, caller: &AccountId, block: BlockNumber) -> Result<()> {
        if caller != self.state.owner() {
            return Err(LedgerError::MustBeOwner);
        }
        if self.sale.state(block) == SaleState::Ongoing {
            return Err(LedgerError::InvalidSaleState(
                "liquidity is locked while the sale runs",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{AssetPair, FeeConfig};

    const BASE: AssetId = AssetId::new(1);
    const QUOTE: AssetId = AssetId::new(2);

    fn owner() -> AccountId {
        AccountId::from_bytes([1; 32])
    }

    fn make_pool() -> LiquidityBootstrappingPool {
        let Ok(pair) = AssetPair::new(BASE, QUOTE) else {
            panic!("distinct assets");
        };
        let (Ok(hi), Ok(lo)) = (Permill::new(900_000), Permill::new(500_000)) else {
            panic!("valid weights");
        };
        let Ok(sale) = Sale::new(10, 110, hi, lo) else {
            panic!("valid sale");
        };
        let Ok(cfg) = LiquidityBootstrappingConfig::new(pair, FeeConfig::ZERO, sale) else {
            panic!("valid config");
        };
        let identity = PoolIdentity {
            owner: owner(),
            lp_token: AssetId::new(100),
        };
        let Ok(mut pool) = LiquidityBootstrappingPool::from_config(&cfg, identity) else {
            panic!("valid pool");
        };
        let Ok(seed) = pool.quote_add(
            Amount::new(9_000_000),
            Amount::new(1_000_000),
            Amount::ZERO,
        ) else {
            panic!("first deposit");
        };
        let Ok(()) = pool.apply_add(&seed) else {
            panic!("seeded");
        };
        pool
    }

    #[test]
    fn only_owner_adds() {
        let pool = make_pool();
        assert!(pool.ensure_can_add(&owner(), 1).is_ok());
        assert_eq!(
            pool.ensure_can_add(&AccountId::from_bytes([2; 32]), 1),
            Err(LedgerError::MustBeOwner)
        );
    }

    #[test]
    fn trading_only_during_sale() {
        let pool = make_pool();
        assert!(matches!(
            pool.quote_exact_in(QUOTE, Amount::new(1_000), 5),
            Err(LedgerError::InvalidSaleState(_))
        ));
        assert!(pool.quote_exact_in(QUOTE, Amount::new(1_000), 50).is_ok());
        assert!(matches!(
            pool.quote_exact_in(QUOTE, Amount::new(1_000), 110),
            Err(LedgerError::InvalidSaleState(_))
        ));
    }

    #[test]
    fn liquidity_locked_during_sale() {
        let pool = make_pool();
        assert!(pool.ensure_can_remove(&owner(), 5).is_ok());
        assert!(pool.ensure_can_remove(&owner(), 50).is_err());
        assert!(pool.ensure_can_remove(&owner(), 110).is_ok());
    }

    #[test]
    fn base_price_decays_as_weight_shifts() {
        let pool = make_pool();
        let (Ok(early), Ok(late)) = (pool.spot_price(BASE, 10), pool.spot_price(BASE, 100)) else {
            panic!("priced");
        };
        assert!(early > late);
    }
}
