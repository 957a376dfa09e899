//! # AMM Collaborator - Pool Engine Contract and Reference Implementation
//!
//! ## Purpose
//!
//! Defines the contract the pair registry consumes from a constant-product pool
//! engine, and ships an in-memory engine implementing it with Uniswap V2 rules.
//! The registry only ever hands this crate a derived pair address; reserves,
//! liquidity shares and swaps live entirely behind [`AmmCollaborator`].
//!
//! ## Integration Points
//!
//! - **Input Sources**: pair addresses and sorted tokens from the pair factory
//! - **Output Destinations**: router and migration coordinator deposits
//! - **Precision**: `Decimal` token units truncated at 18 decimals, matching wei
//! - **Concurrency**: pools in a `DashMap`, one shard lock per read-modify-write
//!
//! ## Components
//!
//! - [`pool_traits`]: the async collaborator trait
//! - [`v2_math`]: output/input amounts, quotes, mint and burn share math
//! - [`memory`]: [`InMemoryAmm`] reference engine
//! - [`error`]: [`AmmError`]

pub mod error;
pub mod memory;
pub mod pool_traits;
pub mod v2_math;

pub use error::AmmError;
pub use memory::{InMemoryAmm, PoolEntry};
pub use pool_traits::AmmCollaborator;
pub use v2_math::{
    truncate, V2Math, V2PoolState, DEFAULT_FEE_BPS, MINIMUM_LIQUIDITY, TOKEN_DECIMALS, WEI,
};

/// Common types for AMM calculations
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
