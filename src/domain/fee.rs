//! Trade fee configuration and the fee split computed for each trade.

use serde::{Deserialize, Serialize};

use super::{Amount, Permill};
use crate::error::{LedgerError, Result};

/// Fee rates of a pool, all in parts per million.
///
/// - `fee_rate` is charged on the input amount of every trade.
/// - `owner_fee_rate` is the share of that fee paid to the pool owner.
/// - `protocol_fee_rate` is the share of that fee paid to the treasury.
///
/// What remains of the fee stays in the reserves as LP value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Total fee taken from the input amount.
    pub fee_rate: Permill,
    /// Portion of the fee paid to the pool owner.
    pub owner_fee_rate: Permill,
    /// Portion of the fee paid to the protocol treasury.
    pub protocol_fee_rate: Permill,
}

/// Fee split of a single trade, denominated in the asset paid in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fee {
    /// Total fee.
    pub fee: Amount,
    /// Paid to the pool owner.
    pub owner_fee: Amount,
    /// Paid to the treasury.
    pub protocol_fee: Amount,
}

impl Fee {
    /// The part of the fee left in the pool for liquidity providers.
    pub fn lp_fee(&self) -> Amount {
        self.fee
            .saturating_sub(&self.owner_fee)
            .saturating_sub(&self.protocol_fee)
    }

    /// Owner and protocol fee together, the part that leaves the pool.
    pub fn external(&self) -> Amount {
        self.owner_fee.saturating_add(&self.protocol_fee)
    }
}

impl FeeConfig {
    /// A fee configuration that charges nothing.
    pub const ZERO: Self = Self {
        fee_rate: Permill::ZERO,
        owner_fee_rate: Permill::ZERO,
        protocol_fee_rate: Permill::ZERO,
    };

    /// Creates a fee configuration from raw parts-per-million values.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfiguration`] if any rate exceeds
    /// 1 000 000.  A 100% fee rate is accepted; trades against it are
    /// rejected when priced.
    pub fn new(fee_rate: u32, owner_fee_rate: u32, protocol_fee_rate: u32) -> Result<Self> {
        Ok(Self {
            fee_rate: Permill::new(fee_rate)?,
            owner_fee_rate: Permill::new(owner_fee_rate)?,
            protocol_fee_rate: Permill::new(protocol_fee_rate)?,
        })
    }

    /// Splits the fee for a trade of `amount`.
    ///
    /// All three parts round down.  The protocol part is capped at what the
    /// owner part leaves, so `owner_fee + protocol_fee <= fee` always holds.
    ///
    /// # Errors
    ///
    /// Propagates arithmetic failures from the widened multiply-divide.
    ///
    /// # Examples
    ///
    /// ```
    /// use dex_ledger::domain::{Amount, FeeConfig};
    ///
    /// let cfg = FeeConfig::new(150_000, 20_000, 100_000).expect("valid");
    /// let fee = cfg.compute_fee(Amount::new(1_000_000)).expect("fits");
    /// assert_eq!(fee.fee, Amount::new(150_000));
    /// assert_eq!(fee.owner_fee, Amount::new(3_000));
    /// assert_eq!(fee.protocol_fee, Amount::new(15_000));
    /// ```
    pub fn compute_fee(&self, amount: Amount) -> Result<Fee> {
        let fee = self.fee_rate.mul_floor(amount)?;
        let owner_fee = self.owner_fee_rate.mul_floor(fee)?;
        let remaining = fee
            .checked_sub(&owner_fee)
            .ok_or(LedgerError::Underflow("owner fee exceeds total fee"))?;
        let protocol_fee = core::cmp::min(self.protocol_fee_rate.mul_floor(fee)?, remaining);
        Ok(Fee {
            fee,
            owner_fee,
            protocol_fee,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn cfg(fee: u32, owner: u32, protocol: u32) -> FeeConfig {
        let Ok(c) = FeeConfig::new(fee, owner, protocol) else {
            panic!("valid fee config");
        };
        c
    }

    #[test]
    fn fifteen_percent_fee() {
        let Ok(fee) = cfg(150_000, 0, 0).compute_fee(Amount::new(100_000_000_000)) else {
            panic!("fee computed");
        };
        assert_eq!(fee.fee, Amount::new(15_000_000_000));
        assert_eq!(fee.lp_fee(), fee.fee);
    }

    #[test]
    fn splits_round_down() {
        let Ok(fee) = cfg(3_000, 333_333, 333_333).compute_fee(Amount::new(1_001)) else {
            panic!("fee computed");
        };
        assert_eq!(fee.fee, Amount::new(3));
        assert_eq!(fee.owner_fee, Amount::new(0));
        assert_eq!(fee.protocol_fee, Amount::new(0));
    }

    #[test]
    fn protocol_share_is_capped_by_remaining_fee() {
        let Ok(fee) = cfg(150_000, 200_000, 1_000_000).compute_fee(Amount::new(1_000_000)) else {
            panic!("fee computed");
        };
        assert_eq!(fee.fee, Amount::new(150_000));
        assert_eq!(fee.owner_fee, Amount::new(30_000));
        assert_eq!(fee.protocol_fee, Amount::new(120_000));
        assert_eq!(fee.lp_fee(), Amount::ZERO);
    }

    #[test]
    fn tiny_trades_never_produce_negative_fee() {
        let c = cfg(150_000, 500_000, 500_000);
        for amount in 0..50u128 {
            let Ok(fee) = c.compute_fee(Amount::new(amount)) else {
                panic!("fee computed");
            };
            assert!(fee.external() <= fee.fee);
        }
    }

    #[test]
    fn full_fee_rate_takes_everything() {
        let c = cfg(1_000_000, 200_000, 0);
        assert_eq!(
            c.compute_fee(Amount::new(1_000)),
            Ok(Fee {
                fee: Amount::new(1_000),
                owner_fee: Amount::new(200),
                protocol_fee: Amount::ZERO,
            })
        );
        assert!(FeeConfig::new(1_000_001, 0, 0).is_err());
    }
}
