//! Wallet event records
//!
//! Every state-changing wallet operation appends one of these to the
//! wallet's event log. The log is part of the externally observable
//! state surface.

use crate::types::{Address, CallMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalletEvent {
    /// A transaction passed authorization and was dispatched
    Executed {
        #[serde(with = "hex_digest")]
        digest: [u8; 32],
        target: Address,
        #[serde(with = "dec_u128")]
        value: u128,
        mode: CallMode,
        nonce: u64,
        success: bool,
    },
    OwnersChanged {
        old_owners: Vec<Address>,
        new_owners: Vec<Address>,
        old_threshold: usize,
        new_threshold: usize,
    },
    DelegateWhitelistChanged {
        target: Address,
        trusted: bool,
    },
    WithdrawalWhitelistChanged {
        recipient: Address,
        allowed: bool,
    },
    Upgraded {
        old_component: Address,
        new_component: Address,
        old_version: String,
        new_version: String,
    },
    EmergencyWithdrawal {
        recipient: Address,
        #[serde(with = "dec_u128")]
        amount: u128,
    },
    NonceCancelled {
        cancelled_through: u64,
        resulting_nonce: u64,
    },
}

/// Hex-string serde for 32-byte digests
mod hex_digest {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(digest: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(digest)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let stripped = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(stripped).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}

/// Decimal-string serde for u128 amounts.
///
/// The tagged-enum representation buffers field values through serde's
/// internal content type, which has no u128 case, so raw u128 fields
/// cannot round-trip here.
mod dec_u128 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
