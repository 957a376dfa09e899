//! AMM collaborator errors

use thiserror::Error;
use types::{PairAddress, TokenAddress};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    #[error("no pool instance at {0}")]
    UnknownPair(PairAddress),

    #[error("pool instance {pair} already exists for a different token pair")]
    PairConflict { pair: PairAddress },

    #[error("insufficient liquidity minted")]
    InsufficientLiquidityMinted,

    #[error("insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    #[error("insufficient input amount")]
    InsufficientInputAmount,

    #[error("insufficient output amount")]
    InsufficientOutputAmount,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("token {token} is not part of pool {pair}")]
    InvalidToken {
        token: TokenAddress,
        pair: PairAddress,
    },

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("AMM unavailable: {0}")]
    Unavailable(String),
}
