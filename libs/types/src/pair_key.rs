//! Canonical unordered token pair

use crate::address::TokenAddress;
use crate::errors::PairKeyError;
use serde::{Deserialize, Serialize};

/// Sort two tokens into `(token0, token1)` and validate them
///
/// Identical tokens are rejected first, then the zero token. Because the zero
/// address is the minimum of the total order, checking `token0` is enough.
pub fn sort_tokens(
    token_a: TokenAddress,
    token_b: TokenAddress,
) -> Result<(TokenAddress, TokenAddress), PairKeyError> {
    if token_a == token_b {
        return Err(PairKeyError::IdenticalTokens(token_a));
    }
    let (token0, token1) = if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };
    if token0.is_zero() {
        return Err(PairKeyError::ZeroToken);
    }
    Ok((token0, token1))
}

/// Unordered pair of distinct non-zero tokens, stored as `(min, max)`
///
/// The fields are private: a `PairKey` can only be obtained through
/// [`PairKey::new`], so `token0 < token1` holds for every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PairKey {
    token0: TokenAddress,
    token1: TokenAddress,
}

impl PairKey {
    /// Canonicalize two tokens supplied in any order
    pub fn new(token_a: TokenAddress, token_b: TokenAddress) -> Result<Self, PairKeyError> {
        let (token0, token1) = sort_tokens(token_a, token_b)?;
        Ok(Self { token0, token1 })
    }

    #[inline]
    pub fn token0(&self) -> TokenAddress {
        self.token0
    }

    #[inline]
    pub fn token1(&self) -> TokenAddress {
        self.token1
    }

    pub fn contains(&self, token: TokenAddress) -> bool {
        self.token0 == token || self.token1 == token
    }

    /// The counterpart of `token`, or `None` if `token` is not in the pair
    pub fn other(&self, token: TokenAddress) -> Option<TokenAddress> {
        if token == self.token0 {
            Some(self.token1)
        } else if token == self.token1 {
            Some(self.token0)
        } else {
            None
        }
    }

    /// Packed `token0 ‖ token1`, the preimage of the per-pair salt
    pub fn packed(&self) -> [u8; 40] {
        let mut out = [0u8; 40];
        out[..20].copy_from_slice(self.token0.as_bytes());
        out[20..].copy_from_slice(self.token1.as_bytes());
        out
    }
}

// Deserialization re-validates so a persisted key can never break the ordering
impl<'de> Deserialize<'de> for PairKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            token0: TokenAddress,
            token1: TokenAddress,
        }

        let raw = Raw::deserialize(deserializer)?;
        PairKey::new(raw.token0, raw.token1).map_err(serde::de::Error::custom)
    }
}
