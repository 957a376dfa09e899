//! # Pair Factory Types
//!
//! Shared value types for the pair factory workspace.
//!
//! ## Design Philosophy
//!
//! - **Typed Addresses**: tokens, accounts and pairs share a 20-byte layout but are
//!   distinct types, so a holder can never be passed where a token is expected
//! - **Canonical Keys**: [`PairKey`] is the only way to name a pair and is always
//!   stored as `(token0, token1)` with `token0 < token1`
//! - **Explicit Salt**: the derivation constant ([`PairSalt`]) is data, never a
//!   compiled-in constant
//!
//! ## Quick Start
//!
//! ```rust
//! use types::{PairKey, TokenAddress};
//!
//! let weth: TokenAddress = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2".parse().unwrap();
//! let usdc: TokenAddress = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".parse().unwrap();
//!
//! let key = PairKey::new(weth, usdc).unwrap();
//! assert_eq!(key.token0(), usdc);
//! assert_eq!(key, PairKey::new(usdc, weth).unwrap());
//! ```

pub mod address;
pub mod errors;
pub mod pair_key;
pub mod salt;

pub use address::{AccountAddress, PairAddress, TokenAddress, ADDRESS_LEN};
pub use errors::{PairKeyError, ParseError};
pub use pair_key::{sort_tokens, PairKey};
pub use salt::{keccak256, InitCodeHash, PairSalt};
