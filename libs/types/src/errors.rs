//! Error types for address parsing and pair-key validation

use crate::address::TokenAddress;
use thiserror::Error;

/// Why a token pair cannot form a pair key
///
/// Both variants are caller errors and are raised before any state changes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PairKeyError {
    /// Self-pairing: both sides name the same token
    #[error("identical tokens: {0}")]
    IdenticalTokens(TokenAddress),

    /// One side is the zero (null) token
    #[error("zero token address")]
    ZeroToken,
}

/// Errors from parsing textual addresses and hashes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input is not valid hexadecimal
    #[error("invalid hex '{input}': {reason}")]
    InvalidHex { input: String, reason: String },

    /// Decoded byte length does not match the expected width
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Decode `0x`-prefixed (or bare) hex into a fixed-width array
pub(crate) fn decode_fixed<const N: usize>(input: &str) -> Result<[u8; N], ParseError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);

    let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex {
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    if bytes.len() != N {
        return Err(ParseError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }

    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}
