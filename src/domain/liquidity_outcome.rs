//! Outcomes of liquidity deposits and withdrawals.

use serde::{Deserialize, Serialize};

use super::Amount;

/// Result of adding liquidity.
///
/// `base_used`/`quote_used` may be lower than the amounts offered: only the
/// proportional part is taken from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AddLiquidityOutcome {
    /// LP tokens minted to the caller.
    pub lp_minted: Amount,
    /// Base asset moved into the pool.
    pub base_used: Amount,
    /// Quote asset moved into the pool.
    pub quote_used: Amount,
}

/// Result of removing liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RemoveLiquidityOutcome {
    /// LP tokens burned from the caller.
    pub lp_burned: Amount,
    /// Base asset paid out.
    pub base_returned: Amount,
    /// Quote asset paid out.
    pub quote_returned: Amount,
}
