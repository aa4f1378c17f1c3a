//! Shared types for the multisig account engine
//!
//! Core identity and signature types used across the wallet, the
//! authorizer, and the implementation registry.

use crate::error::{ErrorCode, MultisigError, MultisigResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Constants
// =============================================================================

/// Maximum number of owners a wallet may hold
pub const MAX_OWNERS: usize = 50;

/// Cap on return data copied back from a CALL-mode dispatch (returnbomb defense)
pub const MAX_RETURN_DATA: usize = 512;

/// Gas allowance forwarded to CALL-mode callees
pub const CALL_GAS_ALLOWANCE: u64 = 100_000;

// =============================================================================
// Address
// =============================================================================

/// A 20-byte account identity.
///
/// Ordering is byte-lexicographic; the authorizer relies on it as the
/// canonical identity ordering for ascending-signature checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address, never a valid owner or target
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse from a hex string, with or without the `0x` prefix
    pub fn from_hex(s: &str) -> MultisigResult<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| {
            MultisigError::new(ErrorCode::InvalidAddress, format!("invalid hex: {}", e))
        })?;
        if bytes.len() != 20 {
            return Err(MultisigError::new(
                ErrorCode::InvalidAddress,
                format!("expected 20 bytes, got {}", bytes.len()),
            ));
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }

    /// Lowercase hex rendering with `0x` prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// EIP-55 checksummed rendering
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = crate::hashing::keccak256(lower.as_bytes());

        let mut result = String::from("0x");
        for (i, ch) in lower.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

            if ch.is_ascii_digit() {
                result.push(ch);
            } else if nibble >= 8 {
                result.push(ch.to_ascii_uppercase());
            } else {
                result.push(ch);
            }
        }
        result
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = MultisigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Signature
// =============================================================================

/// A recoverable ECDSA signature in r || s || v form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

impl Signature {
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Self { r, s, v }
    }

    /// Serialize as 65 bytes: r || s || v
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// Parse from 65 bytes: r || s || v
    pub fn from_bytes(bytes: &[u8]) -> MultisigResult<Self> {
        if bytes.len() != 65 {
            return Err(MultisigError::new(
                ErrorCode::InvalidInput,
                format!("expected 65 signature bytes, got {}", bytes.len()),
            ));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }
}

// =============================================================================
// Call mode
// =============================================================================

/// How the executor dispatches a transaction's call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallMode {
    /// Forward call into the target's own code and state
    Call,
    /// Run whitelisted target logic against the calling wallet's state
    Delegate,
}

impl CallMode {
    /// Numeric encoding used inside the canonical transaction hash
    pub fn as_u8(&self) -> u8 {
        match self {
            CallMode::Call => 0,
            CallMode::Delegate => 1,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
