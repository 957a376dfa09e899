//! Typed 20-byte addresses
//!
//! Tokens, accounts and pairs are all 20-byte values on chain. Each gets its own
//! wrapper so the compiler rejects a holder passed where a token is expected.
//!
//! Ordering is lexicographic over the bytes, which is the same total order as the
//! big-endian 160-bit integer value. Canonical pair ordering relies on this.
//!
//! ```rust
//! use types::TokenAddress;
//!
//! let a = TokenAddress::from_bytes([0x01; 20]);
//! let b: TokenAddress = "0x0202020202020202020202020202020202020202".parse().unwrap();
//! assert!(a < b);
//! assert_eq!(b.to_string(), "0x0202020202020202020202020202020202020202");
//! ```

use crate::errors::{decode_fixed, ParseError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Width of every address type in bytes
pub const ADDRESS_LEN: usize = 20;

/// Defines a typed address wrapper over `[u8; 20]`
macro_rules! define_address {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name([u8; ADDRESS_LEN]);

        impl $name {
            /// The all-zero address, used as the null sentinel
            pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

            /// Wrap raw bytes
            #[inline(always)]
            pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
                Self(bytes)
            }

            /// Build from the trailing 20 bytes of a wider word (e.g. a hash digest)
            pub fn from_word(word: &[u8; 32]) -> Self {
                let mut bytes = [0u8; ADDRESS_LEN];
                bytes.copy_from_slice(&word[32 - ADDRESS_LEN..]);
                Self(bytes)
            }

            /// Borrow the raw bytes
            #[inline(always)]
            pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
                &self.0
            }

            /// Extract the raw bytes
            #[inline(always)]
            pub const fn into_bytes(self) -> [u8; ADDRESS_LEN] {
                self.0
            }

            /// True for the null sentinel
            #[inline]
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; ADDRESS_LEN]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_fixed::<ADDRESS_LEN>(s.trim()).map(Self)
            }
        }

        impl From<[u8; ADDRESS_LEN]> for $name {
            #[inline(always)]
            fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
                Self(bytes)
            }
        }

        impl From<$name> for [u8; ADDRESS_LEN] {
            #[inline(always)]
            fn from(address: $name) -> [u8; ADDRESS_LEN] {
                address.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

define_address! {
    /// Address of a fungible token contract
    TokenAddress
}

define_address! {
    /// Address of an externally owned account or contract acting as a party
    /// (holders, fee recipients, the factory deployer)
    AccountAddress
}

define_address! {
    /// Deterministically derived address of a pair instance
    PairAddress
}

impl PairAddress {
    /// View a pair address as an account, e.g. when the pair itself holds funds
    pub fn as_account(&self) -> AccountAddress {
        AccountAddress::from_bytes(self.0)
    }
}
