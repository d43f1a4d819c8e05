//! Privileged-caller check.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::AccountId;

/// Actions gated by the privileged role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Create an AMM pool.
    CreatePool,
    /// Delete an AMM pool owned by someone else.
    DeletePool,
    /// Open a staking reward pool.
    CreateRewardPool,
    /// Change the reward rates of a pool owned by someone else.
    UpdateRewardsPool,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatePool => write!(f, "create_pool"),
            Self::DeletePool => write!(f, "delete_pool"),
            Self::CreateRewardPool => write!(f, "create_reward_pool"),
            Self::UpdateRewardsPool => write!(f, "update_rewards_pool"),
        }
    }
}

/// Decides whether a caller holds the privileged role for an action.
pub trait Authority {
    /// Returns `true` if `caller` may perform `action`.
    fn is_authorized(&self, caller: &AccountId, action: Action) -> bool;
}
