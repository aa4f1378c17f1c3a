//! Deterministic execution environment
//!
//! The single-threaded host the wallets run inside: native balances, the
//! wallet table, the shared implementation registry, and the strategy
//! objects external calls dispatch into. One call completes entirely
//! before the next begins; the only control transfer is the external
//! call boundary inside the executor, where a callee receives the
//! environment back and may attempt to re-enter.
//!
//! Logic components are stateless strategy objects selected by address:
//! `Callee` for forward (CALL) targets with their own state, and
//! `DelegateLogic` for whitelisted targets that run against the calling
//! wallet's own state.

use crate::error::{MultisigError, MultisigResult};
use crate::registry::ImplementationRegistry;
use crate::types::Address;
use crate::wallet::Wallet;
use std::collections::HashMap;

// =============================================================================
// Call dispatch types
// =============================================================================

/// Context handed to a CALL-mode callee
#[derive(Debug, Clone, Copy)]
pub struct CallContext {
    /// The wallet performing the call
    pub caller: Address,
    /// Native value attached to the call
    pub value: u128,
    /// Gas allowance forwarded to the callee
    pub gas_allowance: u64,
}

/// Result of a dispatched call; a failed callee never fails the executor
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub success: bool,
    pub return_data: Vec<u8>,
}

impl CallOutcome {
    pub fn ok(return_data: Vec<u8>) -> Self {
        Self {
            success: true,
            return_data,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            return_data: reason.into().into_bytes(),
        }
    }
}

/// A forward-call target: code running against its own state.
///
/// The callee receives the environment back and may attempt to re-enter
/// `execute_transaction`; the wallet's reentrancy guard rejects that.
pub trait Callee {
    fn call(&mut self, env: &mut Environment, ctx: &CallContext, payload: &[u8]) -> CallOutcome;
}

/// A delegate-call target: trusted code running against the calling
/// wallet's own state. Only reachable through the delegate whitelist.
pub trait DelegateLogic {
    fn execute(&self, wallet: &mut Wallet, payload: &[u8]) -> CallOutcome;
}

// =============================================================================
// Environment
// =============================================================================

/// Process-wide deterministic host state
pub struct Environment {
    pub(crate) chain_id: u64,
    pub(crate) balances: HashMap<Address, u128>,
    pub(crate) wallets: HashMap<Address, Wallet>,
    pub(crate) callees: HashMap<Address, Box<dyn Callee>>,
    pub(crate) delegates: HashMap<Address, Box<dyn DelegateLogic>>,
    pub(crate) registry: ImplementationRegistry,
}

impl Environment {
    pub fn new(chain_id: u64, registry: ImplementationRegistry) -> Self {
        Self {
            chain_id,
            balances: HashMap::new(),
            wallets: HashMap::new(),
            callees: HashMap::new(),
            delegates: HashMap::new(),
            registry,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn registry(&self) -> &ImplementationRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ImplementationRegistry {
        &mut self.registry
    }

    pub fn balance_of(&self, address: Address) -> u128 {
        self.balances.get(&address).copied().unwrap_or(0)
    }

    /// Mint native balance onto an address (host-level faucet)
    pub fn credit(&mut self, address: Address, amount: u128) {
        *self.balances.entry(address).or_insert(0) += amount;
    }

    /// Move native balance between addresses
    pub(crate) fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: u128,
    ) -> MultisigResult<()> {
        if amount == 0 {
            return Ok(());
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(MultisigError::insufficient_balance(format!(
                "{} holds {} but {} is required",
                from.to_hex(),
                from_balance,
                amount
            )));
        }
        self.balances.insert(from, from_balance - amount);
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }

    /// Install a forward-call strategy object at an address
    pub fn register_callee(&mut self, address: Address, callee: Box<dyn Callee>) {
        self.callees.insert(address, callee);
    }

    /// Install delegate logic at an address; wallets still need to
    /// whitelist it before delegate execution can reach it
    pub fn register_delegate(&mut self, address: Address, logic: Box<dyn DelegateLogic>) {
        self.delegates.insert(address, logic);
    }

    /// Deploy a wallet through the registry and install it in the
    /// wallet table; returns the new wallet's address
    pub fn create_wallet(
        &mut self,
        caller: Address,
        owners: &[Address],
        threshold: usize,
        version: &str,
        salt: &[u8; 32],
    ) -> MultisigResult<Address> {
        let wallet = self
            .registry
            .create_wallet(caller, owners, threshold, version, salt)?;
        let address = wallet.address();
        self.wallets.insert(address, wallet);
        Ok(address)
    }

    pub fn wallet(&self, address: Address) -> Option<&Wallet> {
        self.wallets.get(&address)
    }

    /// Host pause authority for a wallet's execution gate
    pub fn set_wallet_paused(&mut self, address: Address, paused: bool) -> MultisigResult<()> {
        let wallet = self
            .wallets
            .get_mut(&address)
            .ok_or_else(|| MultisigError::unknown_wallet(format!("no wallet at {}", address.to_hex())))?;
        wallet.set_paused(paused);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
