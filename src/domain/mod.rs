//! Domain value types shared by pools, the staking ledger and events.
//!
//! Amounts, fractions, identifiers and fee splits are newtypes with
//! validated constructors so that invalid values fail at the boundary.

mod amount;
mod asset_pair;
mod fee;
mod fraction;
mod ids;
mod liquidity_outcome;
mod rounding;
mod sale;
mod swap_outcome;

pub use amount::Amount;
pub use asset_pair::AssetPair;
pub use fee::{Fee, FeeConfig};
pub use fraction::{Perbill, Permill};
pub use ids::{AccountId, AssetId, BlockNumber, Moment, PoolId, PositionId};
pub use liquidity_outcome::{AddLiquidityOutcome, RemoveLiquidityOutcome};
pub use rounding::Rounding;
pub use sale::{Sale, SaleState};
pub use swap_outcome::{SwapOutcome, SwapQuote};
