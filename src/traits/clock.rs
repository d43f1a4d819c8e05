//! Monotonic time source.

use crate::domain::{BlockNumber, Moment};

/// Block height and wall-clock time supplied by the embedding runtime.
///
/// Liquidity bootstrapping weights follow [`Clock::current_block`]; lock
/// expiry and reward emission follow [`Clock::now`].
pub trait Clock {
    /// Current block height.
    fn current_block(&self) -> BlockNumber;

    /// Current time in milliseconds.
    fn now(&self) -> Moment;
}
