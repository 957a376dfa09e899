//! Registry-wide derivation constant
//!
//! Pair addresses are derived CREATE2-style from the factory deployer address and
//! the init-code hash of the pair implementation. Together they form the
//! [`PairSalt`]. Changing either one after pairs exist invalidates every address
//! that was derived from it, so registries treat the salt as write-once.

use crate::address::AccountAddress;
use crate::errors::{decode_fixed, ParseError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Keccak-256 over the concatenation of `parts`
pub fn keccak256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// 32-byte hash of the pair implementation's creation code
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InitCodeHash([u8; 32]);

impl InitCodeHash {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash arbitrary creation code
    pub fn of_code(code: &[u8]) -> Self {
        Self(keccak256(&[code]))
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for InitCodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for InitCodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InitCodeHash(0x{})", hex::encode(self.0))
    }
}

impl FromStr for InitCodeHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<32>(s.trim()).map(Self)
    }
}

impl Serialize for InitCodeHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for InitCodeHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Derivation constant threaded into every pair-address computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairSalt {
    /// Address of the factory that deploys pairs
    pub deployer: AccountAddress,
    /// Hash of the pair creation code
    pub init_code_hash: InitCodeHash,
}

impl PairSalt {
    pub const fn new(deployer: AccountAddress, init_code_hash: InitCodeHash) -> Self {
        Self {
            deployer,
            init_code_hash,
        }
    }
}
