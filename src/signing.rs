//! Recoverable ECDSA signing over transaction digests
//!
//! Signing and signer-identity recovery for 32-byte digests. Signing is
//! an off-chain coordinator concern; the wallet itself only ever recovers
//! identities from submitted signatures.

use crate::types::{Address, Signature};
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

lazy_static::lazy_static! {
    /// Shared secp256k1 context
    static ref SECP: Secp256k1<All> = Secp256k1::new();
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SigningError {
    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("Invalid digest: {0}")]
    InvalidDigest(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(String),
}

/// An owner's signing key, held by an off-chain coordinator.
///
/// Key material is zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct OwnerKey {
    secret: [u8; 32],
    #[zeroize(skip)]
    address: Address,
}

impl OwnerKey {
    /// Build from raw 32-byte secret key material
    pub fn from_bytes(secret: [u8; 32]) -> Result<Self, SigningError> {
        let key = SecretKey::from_slice(&secret)
            .map_err(|e| SigningError::InvalidSecretKey(e.to_string()))?;
        let public = PublicKey::from_secret_key(&SECP, &key);
        Ok(Self {
            secret,
            address: public_key_to_address(&public),
        })
    }

    /// The address this key signs as
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest, producing an r || s || v signature
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature, SigningError> {
        let secret = SecretKey::from_slice(&self.secret)
            .map_err(|e| SigningError::InvalidSecretKey(e.to_string()))?;
        let message = Message::from_digest_slice(digest)
            .map_err(|e| SigningError::InvalidDigest(e.to_string()))?;

        let (recovery_id, serialized) = SECP
            .sign_ecdsa_recoverable(&message, &secret)
            .serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&serialized[0..32]);
        s.copy_from_slice(&serialized[32..64]);

        // v is recovery_id + 27 (Ethereum convention)
        let v = recovery_id.to_i32() as u8 + 27;

        Ok(Signature::new(r, s, v))
    }
}

/// Recover the signer's address from a digest and signature
pub fn recover_signer(digest: &[u8; 32], signature: &Signature) -> Result<Address, SigningError> {
    let recovery_id = secp256k1::ecdsa::RecoveryId::from_i32(signature.v as i32 - 27)
        .map_err(|e| SigningError::InvalidRecoveryId(e.to_string()))?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[0..32].copy_from_slice(&signature.r);
    sig_bytes[32..64].copy_from_slice(&signature.s);

    let recoverable =
        secp256k1::ecdsa::RecoverableSignature::from_compact(&sig_bytes, recovery_id)
            .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;

    let message = Message::from_digest_slice(digest)
        .map_err(|e| SigningError::InvalidDigest(e.to_string()))?;

    let public_key = SECP
        .recover_ecdsa(&message, &recoverable)
        .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;

    Ok(public_key_to_address(&public_key))
}

/// Convert a secp256k1 public key to a 20-byte address
fn public_key_to_address(public_key: &PublicKey) -> Address {
    let pubkey_bytes = public_key.serialize_uncompressed();

    // Hash the public key, excluding the 0x04 prefix, keep the last 20 bytes
    let hash = crate::hashing::keccak256(&pubkey_bytes[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..32]);
    Address(out)
}

// =============================================================================
// Tests
// =============================================================================
