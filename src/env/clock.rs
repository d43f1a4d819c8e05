use crate::domain::{BlockNumber, Moment};
use crate::traits::Clock;

/// Deterministic clock advanced by hand.
///
/// Each block lasts `block_time_ms`; advancing by blocks moves time too.
///
/// ```
/// use dex_ledger::env::ManualClock;
/// use dex_ledger::traits::Clock;
///
/// let mut clock = ManualClock::new(6_000);
/// clock.advance_blocks(10);
/// assert_eq!(clock.current_block(), 11);
/// assert_eq!(clock.now(), 60_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManualClock {
    block: BlockNumber,
    now: Moment,
    block_time_ms: u64,
}

impl ManualClock {
    /// Clock at block 1, time 0.
    #[must_use]
    pub const fn new(block_time_ms: u64) -> Self {
        Self {
            block: 1,
            now: 0,
            block_time_ms,
        }
    }

    /// Moves forward `blocks` blocks and the matching time.
    pub fn advance_blocks(&mut self, blocks: u64) {
        self.block = self.block.saturating_add(blocks);
        self.now = self
            .now
            .saturating_add(blocks.saturating_mul(self.block_time_ms));
    }

    /// Moves forward `ms` milliseconds and the blocks they span.
    pub fn advance_time(&mut self, ms: u64) {
        if self.block_time_ms > 0 {
            self.block = self.block.saturating_add(ms / self.block_time_ms);
        }
        self.now = self.now.saturating_add(ms);
    }

    /// Jumps to `block`, moving time by the blocks skipped.  Never goes back.
    pub fn set_block(&mut self, block: BlockNumber) {
        if block > self.block {
            self.advance_blocks(block - self.block);
        }
    }

    /// Milliseconds per block.
    #[must_use]
    pub const fn block_time_ms(&self) -> u64 {
        self.block_time_ms
    }
}

impl Clock for ManualClock {
    fn current_block(&self) -> BlockNumber {
        self.block
    }

    fn now(&self) -> Moment {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_advance_spans_blocks() {
        let mut clock = ManualClock::new(6_000);
        clock.advance_time(13_000);
        assert_eq!(clock.current_block(), 3);
        assert_eq!(clock.now(), 13_000);
    }

    #[test]
    fn set_block_is_monotonic() {
        let mut clock = ManualClock::new(1_000);
        clock.set_block(5);
        clock.set_block(2);
        assert_eq!(clock.current_block(), 5);
        assert_eq!(clock.now(), 4_000);
    }
}
