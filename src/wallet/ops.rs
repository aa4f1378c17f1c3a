//! Privileged self-operations
//!
//! Governance operations a wallet performs on itself: owner replacement,
//! whitelist management, upgrades, emergency withdrawal, and nonce
//! cancellation. Every operation requires the wallet's own address as
//! the caller, which only the executor's self-call dispatch supplies;
//! direct external invocation fails with `Unauthorized`.
//!
//! The operations travel through `executeTransaction` as a bincode
//! encoded `SelfOperation` payload addressed to the wallet itself.

use crate::environment::CallOutcome;
use crate::error::{ErrorCode, MultisigError, MultisigResult};
use crate::registry::ImplementationRegistry;
use crate::types::Address;
use crate::wallet::events::WalletEvent;
use crate::wallet::{owners, Wallet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A governance operation addressed to the wallet itself
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelfOperation {
    ChangeOwners {
        owners: Vec<Address>,
        threshold: usize,
    },
    SetTrustedDelegate {
        target: Address,
        trusted: bool,
    },
    SetWithdrawalRecipient {
        recipient: Address,
        allowed: bool,
    },
    Upgrade {
        version: String,
    },
    Withdraw {
        recipient: Address,
    },
    CancelNonce {
        target: u64,
    },
}

impl SelfOperation {
    /// Encode as an executeTransaction payload
    pub fn encode(&self) -> MultisigResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| {
            MultisigError::new(ErrorCode::InvalidPayload, format!("encode failed: {}", e))
        })
    }

    /// Decode from an executeTransaction payload
    pub fn decode(payload: &[u8]) -> MultisigResult<Self> {
        bincode::deserialize(payload).map_err(|e| {
            MultisigError::new(
                ErrorCode::InvalidPayload,
                format!("not a self-operation payload: {}", e),
            )
        })
    }
}

impl Wallet {
    fn require_self(&self, caller: Address) -> MultisigResult<()> {
        if caller != self.address {
            return Err(MultisigError::unauthorized(
                "privileged operations accept only the wallet itself as caller",
            ));
        }
        Ok(())
    }

    /// Replace the owner set and threshold atomically.
    ///
    /// Validation is pure and happens before any mutation; on failure the
    /// previous configuration survives untouched.
    pub fn change_owners(
        &mut self,
        caller: Address,
        new_owners: &[Address],
        new_threshold: usize,
    ) -> MultisigResult<()> {
        self.require_self(caller)?;
        owners::validate_owner_config(new_owners, new_threshold)?;

        let old_owners = std::mem::replace(&mut self.owners, new_owners.to_vec());
        let old_threshold = self.threshold;
        self.is_owner = owners::build_membership(&self.owners);
        self.threshold = new_threshold;

        self.record_event(WalletEvent::OwnersChanged {
            old_owners,
            new_owners: new_owners.to_vec(),
            old_threshold,
            new_threshold,
        });
        Ok(())
    }

    /// Grant or revoke delegate-execution trust for a target
    pub fn set_trusted_delegate(
        &mut self,
        caller: Address,
        target: Address,
        trusted: bool,
    ) -> MultisigResult<()> {
        self.require_self(caller)?;
        if target.is_zero() {
            return Err(MultisigError::invalid_input(
                "delegate target is the zero address",
            ));
        }

        self.trusted_delegates.set(target, trusted);
        self.record_event(WalletEvent::DelegateWhitelistChanged { target, trusted });
        Ok(())
    }

    /// Grant or revoke emergency-withdrawal eligibility for a recipient
    pub fn set_withdrawal_recipient(
        &mut self,
        caller: Address,
        recipient: Address,
        allowed: bool,
    ) -> MultisigResult<()> {
        self.require_self(caller)?;
        if recipient.is_zero() {
            return Err(MultisigError::invalid_input(
                "withdrawal recipient is the zero address",
            ));
        }

        self.withdrawal_recipients.set(recipient, allowed);
        self.record_event(WalletEvent::WithdrawalWhitelistChanged { recipient, allowed });
        Ok(())
    }

    /// Switch the installed logic component to a registry version.
    ///
    /// The registry must be the factory this wallet was created by, and
    /// the version must currently be usable as an upgrade target.
    pub fn upgrade(
        &mut self,
        caller: Address,
        registry: &ImplementationRegistry,
        version: &str,
    ) -> MultisigResult<()> {
        self.require_self(caller)?;
        if registry.address() != self.factory {
            return Err(MultisigError::unauthorized(
                "registry is not this wallet's factory",
            ));
        }
        let new_component = registry
            .implementation(version)
            .ok_or_else(|| MultisigError::unknown_version(format!("unknown version {}", version)))?
            .component;
        if !registry.usable_for_upgrade(version) {
            return Err(MultisigError::implementation_not_usable(format!(
                "version {} is not usable as an upgrade target",
                version
            )));
        }

        // The previously installed version may have been removed since
        let old_component = registry
            .implementation(&self.version)
            .map(|info| info.component)
            .unwrap_or(Address::ZERO);
        let old_version = std::mem::replace(&mut self.version, version.to_string());

        self.record_event(WalletEvent::Upgraded {
            old_component,
            new_component,
            old_version,
            new_version: version.to_string(),
        });
        Ok(())
    }

    /// Move the wallet's entire native balance to a whitelisted recipient
    pub fn withdraw(
        &mut self,
        caller: Address,
        balances: &mut HashMap<Address, u128>,
        recipient: Address,
    ) -> MultisigResult<u128> {
        self.require_self(caller)?;
        if recipient.is_zero() {
            return Err(MultisigError::invalid_input(
                "withdrawal recipient is the zero address",
            ));
        }
        if !self.withdrawal_recipients.contains(recipient) {
            return Err(MultisigError::new(
                ErrorCode::RecipientNotWhitelisted,
                format!("recipient {} is not whitelisted", recipient.to_hex()),
            ));
        }
        let amount = balances.get(&self.address).copied().unwrap_or(0);
        if amount == 0 {
            return Err(MultisigError::insufficient_balance(
                "wallet balance is zero",
            ));
        }

        balances.insert(self.address, 0);
        *balances.entry(recipient).or_insert(0) += amount;

        self.record_event(WalletEvent::EmergencyWithdrawal { recipient, amount });
        Ok(amount)
    }

    /// Invalidate every pre-signed transaction with nonce <= `target`
    pub fn cancel_nonce(&mut self, caller: Address, target: u64) -> MultisigResult<u64> {
        self.require_self(caller)?;
        let resulting = self.nonce.cancel_up_to(target)?;
        self.record_event(WalletEvent::NonceCancelled {
            cancelled_through: target,
            resulting_nonce: resulting,
        });
        Ok(resulting)
    }
}

/// Run a self-call payload against the wallet.
///
/// Used by the executor when a transaction targets the wallet itself.
/// Operation failures surface as an unsuccessful call outcome carrying
/// the error text; they never fail the executor.
pub(crate) fn dispatch_self_operation(
    wallet: &mut Wallet,
    registry: &ImplementationRegistry,
    balances: &mut HashMap<Address, u128>,
    payload: &[u8],
) -> CallOutcome {
    let operation = match SelfOperation::decode(payload) {
        Ok(op) => op,
        Err(e) => return CallOutcome::failed(e.to_string()),
    };

    let caller = wallet.address();
    let result = match operation {
        SelfOperation::ChangeOwners { owners, threshold } => {
            wallet.change_owners(caller, &owners, threshold)
        }
        SelfOperation::SetTrustedDelegate { target, trusted } => {
            wallet.set_trusted_delegate(caller, target, trusted)
        }
        SelfOperation::SetWithdrawalRecipient { recipient, allowed } => {
            wallet.set_withdrawal_recipient(caller, recipient, allowed)
        }
        SelfOperation::Upgrade { version } => wallet.upgrade(caller, registry, &version),
        SelfOperation::Withdraw { recipient } => {
            wallet.withdraw(caller, balances, recipient).map(|_| ())
        }
        SelfOperation::CancelNonce { target } => wallet.cancel_nonce(caller, target).map(|_| ()),
    };

    match result {
        Ok(()) => CallOutcome::ok(Vec::new()),
        Err(e) => CallOutcome::failed(e.to_string()),
    }
}

// =============================================================================
// Tests
// =============================================================================
