//! Per-call environment handed to the registry and the staking ledger.

use crate::domain::{AccountId, BlockNumber, Moment};
use crate::traits::{Assets, Clock};

/// Who is calling, when, and the balances the call may move.
#[derive(Debug)]
pub struct CallContext<'a, A: ?Sized> {
    /// Signer of the operation.
    pub caller: AccountId,
    /// Block the operation executes in.
    pub block: BlockNumber,
    /// Time the operation executes at, in milliseconds.
    pub now: Moment,
    /// Balance ledger.
    pub assets: &'a mut A,
}

impl<'a, A: Assets + ?Sized> CallContext<'a, A> {
    /// Context at an explicit block and time.
    pub fn new(caller: AccountId, block: BlockNumber, now: Moment, assets: &'a mut A) -> Self {
        Self {
            caller,
            block,
            now,
            assets,
        }
    }

    /// Context reading block and time from `clock`.
    pub fn at<C: Clock + ?Sized>(caller: AccountId, clock: &C, assets: &'a mut A) -> Self {
        Self::new(caller, clock.current_block(), clock.now(), assets)
    }
}
