//! Unified error type for the ledger.
//!
//! Every fallible operation in the crate returns [`LedgerError`].  A failed
//! operation never leaves partial state behind, so callers can branch on the
//! variant and retry with adjusted inputs.

use thiserror::Error;

/// Errors produced by pools, the staking ledger, and their collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// A pool or reward pool configuration is malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// A configuration document could not be parsed.
    #[error("malformed configuration document: {0}")]
    ConfigFormat(String),

    /// The caller lacks the privileged role required for the action.
    #[error("caller is not authorized for this action")]
    Unauthorized,

    /// The action is reserved to the owner of the pool or position.
    #[error("caller must be the owner")]
    MustBeOwner,

    /// The computed amount misses the caller's bound.
    #[error("slippage exceeded: {0}")]
    SlippageExceeded(&'static str),

    /// The caller holds fewer LP tokens than requested.
    #[error("insufficient LP token balance")]
    InsufficientLpBalance,

    /// An account holds less of an asset than it tries to move.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// A transfer would leave an account below the existential deposit.
    #[error("transfer would break the existential deposit")]
    ExistentialDeposit,

    /// A split request is malformed or targets a foreign position.
    #[error("invalid split: {0}")]
    InvalidSplit(&'static str),

    /// No AMM pool exists under the given id.
    #[error("pool not found")]
    PoolNotFound,

    /// No stake position exists under the given id.
    #[error("position not found")]
    PositionNotFound,

    /// No staking reward pool exists under the given id.
    #[error("reward pool not found")]
    RewardPoolNotFound,

    /// An asset does not belong to the pool or reward pool.
    #[error("invalid asset: {0}")]
    InvalidAsset(&'static str),

    /// The liquidity bootstrapping sale is not in a state that allows the call.
    #[error("invalid sale state: {0}")]
    InvalidSaleState(&'static str),

    /// The requested lock duration is not one of the configured presets.
    #[error("duration preset is not configured for this reward pool")]
    InvalidDurationPreset,

    /// The pool still has LP tokens in circulation.
    #[error("pool still has outstanding liquidity")]
    LiquidityOutstanding,

    /// A quantity is zero or otherwise unusable.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),

    /// Reserves cannot satisfy the request.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// A pool reserve is zero where pricing requires it to be positive.
    #[error("zero reserve")]
    ZeroReserve,

    /// Arithmetic overflow.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Arithmetic underflow.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An iterative solver failed to converge.
    #[error("newton-raphson did not converge: {0}")]
    NewtonRaphsonNonConvergence(&'static str),
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, LedgerError>;
