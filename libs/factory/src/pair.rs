//! Registered pair instances

use serde::{Deserialize, Serialize};
use types::{PairAddress, PairKey, TokenAddress};

/// One registered pair
///
/// Shared as `Arc<PairInstance>` between the key lookup and the creation-ordered
/// list, so every caller of `create_pair` for the same tokens observes the same
/// allocation. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairInstance {
    address: PairAddress,
    key: PairKey,
    index: usize,
}

impl PairInstance {
    pub(crate) fn new(address: PairAddress, key: PairKey, index: usize) -> Self {
        Self {
            address,
            key,
            index,
        }
    }

    pub fn address(&self) -> PairAddress {
        self.address
    }

    pub fn key(&self) -> PairKey {
        self.key
    }

    pub fn token0(&self) -> TokenAddress {
        self.key.token0()
    }

    pub fn token1(&self) -> TokenAddress {
        self.key.token1()
    }

    /// Position in creation order (0-based)
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn contains(&self, token: TokenAddress) -> bool {
        self.key.contains(token)
    }

    pub fn other(&self, token: TokenAddress) -> Option<TokenAddress> {
        self.key.other(token)
    }

    /// Reorder `(amount_a, amount_b)` given for `(token_a, other)` into
    /// `(amount0, amount1)`
    ///
    /// Returns `None` if `token_a` is not part of this pair.
    pub fn sorted_amounts<T>(&self, token_a: TokenAddress, amount_a: T, amount_b: T) -> Option<(T, T)> {
        if token_a == self.token0() {
            Some((amount_a, amount_b))
        } else if token_a == self.token1() {
            Some((amount_b, amount_a))
        } else {
            None
        }
    }
}
