use thiserror::Error;

/// Why a bet was refused. A refused bet never mutates the ledger or the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InvalidBet {
    #[error("bet must be greater than zero")]
    NonPositive,
    #[error("bet {bet} exceeds balance {balance}")]
    ExceedsBalance { bet: u64, balance: u64 },
    #[error("a selection is required")]
    EmptySelection,
    #[error("selection is out of range or repeats a value")]
    InvalidSelection,
}

/// Errors returned by round engine operations.
///
/// Neither variant is fatal: callers surface `InvalidBet` as inline feedback and
/// treat `IllegalState` as a no-op.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("invalid bet: {0}")]
    InvalidBet(#[from] InvalidBet),
    #[error("illegal in current state: {0}")]
    IllegalState(&'static str),
}
