//! Unified error types for the multisig account engine
//!
//! All failure paths flow through this module. Every error is raised
//! before any state mutation, so a failed submission can always be
//! corrected and retried.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all multisig operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultisigError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl MultisigError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_owner_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidOwnerConfig, msg)
    }

    pub fn invalid_signatures(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSignatures, msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, msg)
    }

    pub fn untrusted_delegate(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UntrustedDelegate, msg)
    }

    pub fn stale_nonce_target(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::StaleNonceTarget, msg)
    }

    pub fn wallet_paused(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::WalletPaused, msg)
    }

    pub fn reentrant_call(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ReentrantCall, msg)
    }

    pub fn unknown_wallet(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownWallet, msg)
    }

    pub fn unknown_version(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownVersion, msg)
    }

    pub fn implementation_not_usable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ImplementationNotUsable, msg)
    }

    pub fn insufficient_balance(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InsufficientBalance, msg)
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

impl fmt::Display for MultisigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for MultisigError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Validation errors: malformed input, rejected before any state change
    InvalidInput,
    InvalidAddress,
    InvalidOwnerConfig,
    InvalidPayload,

    // Authorization errors
    InvalidSignatures,
    Unauthorized,
    UntrustedDelegate,
    RecipientNotWhitelisted,

    // Governance conflicts
    StaleNonceTarget,

    // Execution gating
    WalletPaused,
    ReentrantCall,
    UnknownWallet,
    InsufficientBalance,

    // Registry errors
    UnknownVersion,
    ImplementationNotUsable,
    VersionExists,
    AddressCollision,

    // Crypto / internal
    CryptoError,
    Internal,
}

/// Result type alias used throughout the crate
pub type MultisigResult<T> = Result<T, MultisigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MultisigError::invalid_input("empty owner set");
        assert_eq!(err.to_string(), "[InvalidInput] empty owner set");
    }

    #[test]
    fn test_error_with_details() {
        let err = MultisigError::unauthorized("caller is not the wallet")
            .with_details("caller 0x00..01");
        assert!(err.to_string().contains("caller 0x00..01"));
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_error_code_serde() {
        let json = serde_json::to_string(&ErrorCode::UntrustedDelegate).unwrap();
        assert_eq!(json, "\"untrusted_delegate\"");
    }
}
