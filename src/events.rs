//! Domain events emitted by committed operations.
//!
//! Events are the only contract the read side consumes: every successful
//! operation returns a [`Receipt`] carrying its typed outcome and the
//! events it produced, in order.  Failed operations emit nothing.

use serde::{Deserialize, Serialize};

use crate::config::PoolKind;
use crate::domain::{
    AccountId, Amount, AssetId, AssetPair, BlockNumber, Fee, PoolId, PositionId,
};

/// Something that happened on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A pool was created.
    PoolCreated {
        /// Pool id.
        pool_id: PoolId,
        /// Pool owner.
        owner: AccountId,
        /// Asset pair.
        pair: AssetPair,
        /// Pool family.
        kind: PoolKind,
        /// LP token id.
        lp_token: AssetId,
    },
    /// An empty pool was deleted.
    PoolDeleted {
        /// Pool id.
        pool_id: PoolId,
        /// Base residue returned to the owner.
        base_amount: Amount,
        /// Quote residue returned to the owner.
        quote_amount: Amount,
    },
    /// Liquidity was deposited.
    LiquidityAdded {
        /// Depositor.
        account: AccountId,
        /// Pool id.
        pool_id: PoolId,
        /// Base deposited.
        base_amount: Amount,
        /// Quote deposited.
        quote_amount: Amount,
        /// LP tokens minted.
        minted_lp: Amount,
    },
    /// Liquidity was withdrawn.
    LiquidityRemoved {
        /// Withdrawer.
        account: AccountId,
        /// Pool id.
        pool_id: PoolId,
        /// Base returned.
        base_amount: Amount,
        /// Quote returned.
        quote_amount: Amount,
        /// LP tokens burned.
        burned_lp: Amount,
    },
    /// A trade settled.  Base is what the account received, quote what it paid.
    Swapped {
        /// Pool id.
        pool_id: PoolId,
        /// Trader.
        account: AccountId,
        /// Asset received.
        base_asset: AssetId,
        /// Asset paid.
        quote_asset: AssetId,
        /// Amount received.
        base_amount: Amount,
        /// Amount paid.
        quote_amount: Amount,
        /// Fee split, in the asset paid.
        fee: Fee,
    },
    /// A staking reward pool was opened.
    RewardPoolCreated {
        /// Reward pool id.
        pool_id: PoolId,
        /// Owner.
        owner: AccountId,
        /// Staked asset.
        staked_asset: AssetId,
        /// Accrual horizon.
        end_block: BlockNumber,
    },
    /// A position was opened.
    Staked {
        /// Reward pool id.
        pool_id: PoolId,
        /// Staker.
        account: AccountId,
        /// Principal.
        amount: Amount,
        /// Lock duration in seconds.
        duration_preset: u64,
        /// New position.
        position_id: PositionId,
        /// Whether the staker's account was kept alive.
        keep_alive: bool,
    },
    /// A position's stake grew.
    StakeAmountExtended {
        /// Position.
        position_id: PositionId,
        /// Added principal.
        amount: Amount,
    },
    /// A position was split in two.
    SplitPosition {
        /// Source position first, new position second.
        position_ids: Vec<PositionId>,
        /// Stakes of the two positions, in the same order.
        stakes: Vec<Amount>,
    },
    /// A position was closed after its lock.
    Unstaked {
        /// Owner.
        account: AccountId,
        /// Closed position.
        position_id: PositionId,
    },
    /// A position was closed early and part of its stake slashed.
    UnstakingSlashed {
        /// Owner.
        account: AccountId,
        /// Closed position.
        position_id: PositionId,
        /// Slashed principal.
        slash_amount: Amount,
    },
    /// Rewards were paid to a position's owner.
    Claimed {
        /// Owner.
        account: AccountId,
        /// Position.
        position_id: PositionId,
        /// Paid amounts per reward asset.
        rewards: Vec<(AssetId, Amount)>,
    },
    /// Reward rates changed.
    RewardPoolUpdated {
        /// Reward pool id.
        pool_id: PoolId,
        /// New per-period amounts per reward asset.
        reward_rates: Vec<(AssetId, Amount)>,
    },
    /// A reward pot was funded.
    RewardsPotIncreased {
        /// Reward pool id.
        pool_id: PoolId,
        /// Reward asset.
        asset_id: AssetId,
        /// Added amount.
        amount: Amount,
    },
}

/// Typed outcome of a committed operation with the events it emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt<T> {
    /// Operation result.
    pub outcome: T,
    /// Emitted events, in order.
    pub events: Vec<Event>,
}

impl<T> Receipt<T> {
    /// Receipt with a single event.
    pub fn new(outcome: T, event: Event) -> Self {
        Self {
            outcome,
            events: vec![event],
        }
    }

    /// Receipt with any number of events.
    pub fn with_events(outcome: T, events: Vec<Event>) -> Self {
        Self { outcome, events }
    }

    /// Maps the outcome, keeping the events.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Receipt<U> {
        Receipt {
            outcome: f(self.outcome),
            events: self.events,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_variant_name() {
        let event = Event::StakeAmountExtended {
            position_id: PositionId::new(3),
            amount: Amount::new(10),
        };
        let Ok(json) = serde_json::to_string(&event) else {
            panic!("serializable");
        };
        assert!(json.starts_with(r#"{"StakeAmountExtended":"#));
        let Ok(back) = serde_json::from_str::<Event>(&json) else {
            panic!("deserializable");
        };
        assert_eq!(back, event);
    }

    #[test]
    fn receipt_map_keeps_events() {
        let receipt = Receipt::new(
            2u8,
            Event::StakeAmountExtended {
                position_id: PositionId::new(1),
                amount: Amount::new(1),
            },
        );
        let mapped = receipt.map(u32::from);
        assert_eq!(mapped.outcome, 2u32);
        assert_eq!(mapped.events.len(), 1);
    }
}
