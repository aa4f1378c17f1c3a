//! Canonical transaction hashing
//!
//! EIP-712 style domain-separated structural hashing for wallet
//! transactions. The digest binds target, value, payload, call mode,
//! nonce, chain id, and the wallet identity, so a signature can never be
//! replayed against a different wallet, chain, or execution slot.
//!
//! The algorithm is pure and exposed publicly so off-chain coordinators
//! can reproduce the exact bytes owners sign over.

use crate::types::{Address, CallMode};
use tiny_keccak::{Hasher, Keccak};

/// Magic prefix for domain-separated digests
const DIGEST_PREFIX: &[u8] = b"\x19\x01";

/// Human-readable name of the signing domain
const DOMAIN_NAME: &str = "MultisigWallet";

/// Major version of the signing domain
const DOMAIN_VERSION: &str = "1";

const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

const TRANSACTION_TYPE: &str =
    "Transaction(address target,uint256 value,bytes payload,uint8 mode,uint256 nonce)";

/// Keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Calculate the domain separator for a wallet on a chain
///
/// domainSeparator = keccak256(typeHash || keccak(name) || keccak(version)
///                             || chainId || walletAddress)
pub fn domain_separator(chain_id: u64, wallet: Address) -> [u8; 32] {
    let mut encoded = Vec::with_capacity(5 * 32);
    encoded.extend_from_slice(&keccak256(DOMAIN_TYPE.as_bytes()));
    encoded.extend_from_slice(&keccak256(DOMAIN_NAME.as_bytes()));
    encoded.extend_from_slice(&keccak256(DOMAIN_VERSION.as_bytes()));
    encoded.extend_from_slice(&pad_u64(chain_id));
    encoded.extend_from_slice(&pad_address(wallet));
    keccak256(&encoded)
}

/// Hash the transaction record itself
///
/// hashStruct(tx) = keccak256(typeHash || encodeData(tx)), with the raw
/// payload folded in as keccak(payload).
pub fn transaction_struct_hash(
    target: Address,
    value: u128,
    payload: &[u8],
    mode: CallMode,
    nonce: u64,
) -> [u8; 32] {
    let mut encoded = Vec::with_capacity(6 * 32);
    encoded.extend_from_slice(&keccak256(TRANSACTION_TYPE.as_bytes()));
    encoded.extend_from_slice(&pad_address(target));
    encoded.extend_from_slice(&pad_u128(value));
    encoded.extend_from_slice(&keccak256(payload));
    encoded.extend_from_slice(&pad_u64(mode.as_u8() as u64));
    encoded.extend_from_slice(&pad_u64(nonce));
    keccak256(&encoded)
}

/// Calculate the final digest owners sign over
///
/// digest = keccak256("\x19\x01" || domainSeparator || hashStruct(tx))
pub fn transaction_digest(
    chain_id: u64,
    wallet: Address,
    target: Address,
    value: u128,
    payload: &[u8],
    mode: CallMode,
    nonce: u64,
) -> [u8; 32] {
    let domain = domain_separator(chain_id, wallet);
    let struct_hash = transaction_struct_hash(target, value, payload, mode, nonce);

    let mut data = Vec::with_capacity(2 + 32 + 32);
    data.extend_from_slice(DIGEST_PREFIX);
    data.extend_from_slice(&domain);
    data.extend_from_slice(&struct_hash);
    keccak256(&data)
}

/// Left-pad an address to a 32-byte word
pub fn pad_address(addr: Address) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(addr.as_bytes());
    out
}

/// Encode a u64 as a big-endian 32-byte word
pub fn pad_u64(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

/// Encode a u128 as a big-endian 32-byte word
pub fn pad_u128(value: u128) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&value.to_be_bytes());
    out
}

// =============================================================================
// Tests
// =============================================================================
