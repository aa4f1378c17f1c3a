//! The multisig wallet account
//!
//! Holds per-account state: owner set and threshold, the replay nonce,
//! the two operation whitelists, the installed logic version, and the
//! event log. All mutation flows through the single authorized execution
//! entry point in `executor`; the privileged self-operations in `ops`
//! require the wallet itself as the caller.

pub mod events;
pub mod executor;
pub mod nonce;
pub mod ops;
pub mod owners;
pub mod whitelist;

use crate::types::Address;
use events::WalletEvent;
use nonce::NonceLedger;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use whitelist::Whitelist;

/// One deployed multisig account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    address: Address,
    factory: Address,
    owners: Vec<Address>,
    is_owner: HashSet<Address>,
    threshold: usize,
    nonce: NonceLedger,
    trusted_delegates: Whitelist,
    withdrawal_recipients: Whitelist,
    version: String,
    paused: bool,
    /// Reentrancy guard, held only for the duration of a dispatch
    #[serde(skip)]
    executing: bool,
    events: Vec<WalletEvent>,
}

impl Wallet {
    /// Construct a freshly initialized account.
    ///
    /// Only the factory calls this, with an already validated owner
    /// configuration; construction is the one-time initialization and
    /// cannot be repeated for an existing address.
    pub(crate) fn new(
        address: Address,
        factory: Address,
        owners: Vec<Address>,
        threshold: usize,
        version: String,
    ) -> Self {
        let is_owner = owners::build_membership(&owners);
        Self {
            address,
            factory,
            owners,
            is_owner,
            threshold,
            nonce: NonceLedger::new(),
            trusted_delegates: Whitelist::new(),
            withdrawal_recipients: Whitelist::new(),
            version,
            paused: false,
            executing: false,
            events: Vec::new(),
        }
    }

    // =========================================================================
    // Observable state surface
    // =========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    pub fn is_owner(&self, address: Address) -> bool {
        self.is_owner.contains(&address)
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn nonce(&self) -> u64 {
        self.nonce.current()
    }

    pub fn is_trusted_delegate(&self, target: Address) -> bool {
        self.trusted_delegates.contains(target)
    }

    pub fn trusted_delegates(&self) -> Vec<Address> {
        self.trusted_delegates.entries()
    }

    pub fn is_withdrawal_recipient(&self, recipient: Address) -> bool {
        self.withdrawal_recipients.contains(recipient)
    }

    pub fn withdrawal_recipients(&self) -> Vec<Address> {
        self.withdrawal_recipients.entries()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn events(&self) -> &[WalletEvent] {
        &self.events
    }

    /// Pause gate, toggled by the host's pause authority
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    // Internal accessors for the executor and the privileged operations

    pub(crate) fn membership(&self) -> &HashSet<Address> {
        &self.is_owner
    }

    pub(crate) fn nonce_ledger_mut(&mut self) -> &mut NonceLedger {
        &mut self.nonce
    }

    pub(crate) fn is_executing(&self) -> bool {
        self.executing
    }

    pub(crate) fn set_executing(&mut self, executing: bool) {
        self.executing = executing;
    }

    pub(crate) fn record_event(&mut self, event: WalletEvent) {
        self.events.push(event);
    }
}
