//! Deterministic pair-address derivation
//!
//! CREATE2 layout, identical to the on-chain factory:
//!
//! ```text
//! pair_salt = keccak256(token0 ‖ token1)
//! address   = keccak256(0xff ‖ deployer ‖ pair_salt ‖ init_code_hash)[12..]
//! ```
//!
//! Tokens are sorted before hashing, so argument order never changes the result.

use crate::error::FactoryError;
use tracing::trace;
use types::{keccak256, PairAddress, PairKey, PairSalt, TokenAddress};

const CREATE2_PREFIX: [u8; 1] = [0xff];

/// Derive the address for an already-canonical key
pub fn derive_for_key(key: &PairKey, salt: &PairSalt) -> PairAddress {
    let pair_salt = keccak256(&[&key.packed()]);
    let digest = keccak256(&[
        &CREATE2_PREFIX,
        salt.deployer.as_bytes(),
        &pair_salt,
        salt.init_code_hash.as_bytes(),
    ]);
    let address = PairAddress::from_word(&digest);
    trace!(token0 = %key.token0(), token1 = %key.token1(), %address, "derived pair address");
    address
}

/// Derive the address for two tokens in any order
///
/// Fails with [`FactoryError::InvalidPairKind`] for identical or zero tokens.
pub fn derive_pair_address(
    token_a: TokenAddress,
    token_b: TokenAddress,
    salt: &PairSalt,
) -> Result<PairAddress, FactoryError> {
    let key = PairKey::new(token_a, token_b)?;
    Ok(derive_for_key(&key, salt))
}
