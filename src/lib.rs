//! Multisig Core Library
//!
//! A self-sovereign, upgradeable k-of-n multisignature account engine:
//! a factory-side implementation registry that deploys per-user wallet
//! instances, and the wallet logic itself with signature-gated
//! transaction execution, governance self-operations, and emergency exit.
//!
//! # Architecture
//!
//! This crate provides:
//! - **hashing**: domain-separated structural hashing of transactions
//! - **signing**: recoverable ECDSA over transaction digests
//! - **authorizer**: ordered k-of-n signature verification
//! - **wallet**: per-account state, the execution state machine, and
//!   the privileged self-operations
//! - **registry**: the versioned implementation catalog and factory
//! - **environment**: the deterministic host wallets execute inside
//!
//! # Example
//!
//! ```rust,ignore
//! use multisig_core::{Environment, ImplementationRegistry, TransactionRequest};
//!
//! let mut env = Environment::new(chain_id, registry);
//! let wallet = env.create_wallet(creator, &owners, 2, "v1", &salt)?;
//! let digest = env.transaction_digest_for(wallet, &request)?;
//! // ...owners sign the digest off-chain, sorted by address...
//! let receipt = env.execute_transaction(wallet, &request, &signatures)?;
//! assert!(receipt.success);
//! ```

pub mod authorizer;
pub mod environment;
pub mod error;
pub mod hashing;
pub mod registry;
pub mod signing;
pub mod types;
pub mod wallet;

// Re-export key types for convenience
pub use error::{ErrorCode, MultisigError, MultisigResult};
pub use types::{Address, CallMode, Signature, CALL_GAS_ALLOWANCE, MAX_OWNERS, MAX_RETURN_DATA};

pub use environment::{CallContext, CallOutcome, Callee, DelegateLogic, Environment};
pub use registry::{ImplementationInfo, ImplementationRegistry, RegistryEvent};
pub use signing::{recover_signer, OwnerKey, SigningError};
pub use wallet::events::WalletEvent;
pub use wallet::executor::{ExecutionReceipt, TransactionRequest};
pub use wallet::ops::SelfOperation;
pub use wallet::Wallet;

pub use authorizer::verify_signatures;
pub use hashing::{domain_separator, keccak256, transaction_digest, transaction_struct_hash};
