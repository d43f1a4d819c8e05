//! Liquidity bootstrapping sale window and weight schedule.

use serde::{Deserialize, Serialize};

use super::{BlockNumber, Permill, Rounding};
use crate::error::{LedgerError, Result};
use crate::math::mul_div;

/// Phase of a sale relative to the current block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleState {
    /// `block < start`: liquidity may be seeded, trading is closed.
    NotStarted,
    /// `start <= block < end`: trading is open.
    Ongoing,
    /// `block >= end`.
    Ended,
}

/// Sale schedule of a liquidity bootstrapping pool.
///
/// The base asset weight moves linearly from `initial_weight` at `start`
/// to `final_weight` at `end`; the quote weight is its complement.
///
/// # Examples
///
/// ```
/// use dex_ledger::domain::{Permill, Sale};
///
/// let sale = Sale::new(
///     100,
///     200,
///     Permill::new(900_000).expect("90%"),
///     Permill::new(500_000).expect("50%"),
/// )
/// .expect("valid sale");
/// assert_eq!(sale.weight_at(150).expect("fits").parts(), 700_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sale {
    start: BlockNumber,
    end: BlockNumber,
    initial_weight: Permill,
    final_weight: Permill,
}

impl Sale {
    /// Creates and validates a sale schedule.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidConfiguration`] unless `start < end`
    /// and both weights lie strictly between 0% and 100%.
    pub fn new(
        start: BlockNumber,
        end: BlockNumber,
        initial_weight: Permill,
        final_weight: Permill,
    ) -> Result<Self> {
        let sale = Self {
            start,
            end,
            initial_weight,
            final_weight,
        };
        sale.validate()?;
        Ok(sale)
    }

    /// Validates the schedule.
    ///
    /// # Errors
    ///
    /// See [`Sale::new`].
    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(LedgerError::InvalidConfiguration(
                "sale start must precede sale end",
            ));
        }
        for weight in [self.initial_weight, self.final_weight] {
            if weight.is_zero() || weight.is_one() {
                return Err(LedgerError::InvalidConfiguration(
                    "sale weights must lie strictly between 0% and 100%",
                ));
            }
        }
        Ok(())
    }

    /// First block of the sale.
    #[must_use]
    pub const fn start(&self) -> BlockNumber {
        self.start
    }

    /// First block after the sale.
    #[must_use]
    pub const fn end(&self) -> BlockNumber {
        self.end
    }

    /// Base weight at `start`.
    #[must_use]
    pub const fn initial_weight(&self) -> Permill {
        self.initial_weight
    }

    /// Base weight at and after `end`.
    #[must_use]
    pub const fn final_weight(&self) -> Permill {
        self.final_weight
    }

    /// Phase of the sale at `block`.
    #[must_use]
    pub const fn state(&self, block: BlockNumber) -> SaleState {
        if block < self.start {
            SaleState::NotStarted
        } else if block < self.end {
            SaleState::Ongoing
        } else {
            SaleState::Ended
        }
    }

    /// Base asset weight at `block`, clamped to the schedule's endpoints.
    ///
    /// # Errors
    ///
    /// Propagates arithmetic failures from the interpolation.
    pub fn weight_at(&self, block: BlockNumber) -> Result<Permill> {
        if block <= self.start {
            return Ok(self.initial_weight);
        }
        if block >= self.end {
            return Ok(self.final_weight);
        }
        let elapsed = u128::from(block - self.start);
        let duration = u128::from(self.end - self.start);
        let from = self.initial_weight.parts();
        let to = self.final_weight.parts();
        let parts = if from >= to {
            let delta = mul_div(u128::from(from - to), elapsed, duration, Rounding::Down)?;
            u128::from(from) - delta
        } else {
            let delta = mul_div(u128::from(to - from), elapsed, duration, Rounding::Down)?;
            u128::from(from) + delta
        };
        let parts = u32::try_from(parts).map_err(|_| LedgerError::Overflow("sale weight"))?;
        Permill::new(parts)
    }
}
