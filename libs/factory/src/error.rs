//! Registry error types

use thiserror::Error;
use types::{AccountAddress, PairKeyError, PairSalt};

#[derive(Debug, Error)]
pub enum FactoryError {
    /// Self-pairing or a zero token; rejected before any state change
    #[error("invalid pair kind: {0}")]
    InvalidPairKind(#[from] PairKeyError),

    #[error("forbidden: {caller} is not the fee setter")]
    Forbidden { caller: AccountAddress },

    #[error("salt mismatch: registry configured with {expected:?}, snapshot holds {found:?}")]
    SaltMismatch { expected: PairSalt, found: PairSalt },

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
