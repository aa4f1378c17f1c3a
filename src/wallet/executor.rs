//! Transaction authorization and execution
//!
//! The single authorized entry point into a wallet. One call is one
//! state-machine step: build the canonical digest for the candidate
//! transaction, verify the ordered signature set, enforce delegate
//! whitelisting, advance the replay nonce, dispatch the call, and report
//! the callee's outcome without reverting on callee failure.

use crate::authorizer;
use crate::environment::{CallContext, CallOutcome, Environment};
use crate::error::{MultisigError, MultisigResult};
use crate::hashing;
use crate::types::{Address, CallMode, Signature, CALL_GAS_ALLOWANCE, MAX_RETURN_DATA};
use crate::wallet::events::WalletEvent;
use crate::wallet::ops;
use serde::{Deserialize, Serialize};

/// A candidate transaction assembled by an off-chain coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub target: Address,
    pub value: u128,
    pub payload: Vec<u8>,
    pub mode: CallMode,
}

impl TransactionRequest {
    /// A plain forward call
    pub fn call(target: Address, value: u128, payload: Vec<u8>) -> Self {
        Self {
            target,
            value,
            payload,
            mode: CallMode::Call,
        }
    }

    /// A delegate-mode call against a whitelisted target
    pub fn delegate(target: Address, payload: Vec<u8>) -> Self {
        Self {
            target,
            value: 0,
            payload,
            mode: CallMode::Delegate,
        }
    }

    /// A governance self-operation addressed to the wallet itself
    pub fn self_operation(
        wallet: Address,
        operation: &ops::SelfOperation,
    ) -> MultisigResult<Self> {
        Ok(Self::call(wallet, 0, operation.encode()?))
    }
}

/// What the executor reports back to the submitter
#[derive(Debug, Clone)]
pub struct ExecutionReceipt {
    /// Canonical digest the signatures were checked against
    pub digest: [u8; 32],
    /// The execution slot this transaction consumed
    pub nonce: u64,
    /// The callee's success flag; checking it is the caller's job
    pub success: bool,
    /// Return data, capped for CALL-mode dispatches
    pub return_data: Vec<u8>,
}

impl Environment {
    /// Reproduce the exact digest owners must sign for this request,
    /// bound to the wallet's current nonce
    pub fn transaction_digest_for(
        &self,
        wallet_addr: Address,
        request: &TransactionRequest,
    ) -> MultisigResult<[u8; 32]> {
        let wallet = self.wallets.get(&wallet_addr).ok_or_else(|| {
            MultisigError::unknown_wallet(format!("no wallet at {}", wallet_addr.to_hex()))
        })?;
        Ok(hashing::transaction_digest(
            self.chain_id,
            wallet_addr,
            request.target,
            request.value,
            &request.payload,
            request.mode,
            wallet.nonce(),
        ))
    }

    /// Read-only pre-validation of a signature set against the wallet's
    /// current owner configuration and nonce
    pub fn check_signatures(
        &self,
        wallet_addr: Address,
        request: &TransactionRequest,
        signatures: &[Signature],
    ) -> MultisigResult<bool> {
        let digest = self.transaction_digest_for(wallet_addr, request)?;
        let wallet = self.wallets.get(&wallet_addr).ok_or_else(|| {
            MultisigError::unknown_wallet(format!("no wallet at {}", wallet_addr.to_hex()))
        })?;
        Ok(authorizer::verify_signatures(
            &digest,
            signatures,
            wallet.membership(),
            wallet.owners().len(),
            wallet.threshold(),
        ))
    }

    /// Execute a signed transaction against a wallet.
    ///
    /// Fails with no state change on any validation, authorization, or
    /// gating error. Once the signature set verifies and the gates pass,
    /// the nonce advance is irrevocable: a failing callee is reported
    /// through the receipt's success flag, never as an executor error.
    pub fn execute_transaction(
        &mut self,
        wallet_addr: Address,
        request: &TransactionRequest,
        signatures: &[Signature],
    ) -> MultisigResult<ExecutionReceipt> {
        let chain_id = self.chain_id;
        let wallet_balance = self.balance_of(wallet_addr);

        let (digest, consumed_nonce) = {
            let wallet = self.wallets.get_mut(&wallet_addr).ok_or_else(|| {
                MultisigError::unknown_wallet(format!("no wallet at {}", wallet_addr.to_hex()))
            })?;
            if wallet.is_paused() {
                return Err(MultisigError::wallet_paused("wallet is paused"));
            }
            if wallet.is_executing() {
                return Err(MultisigError::reentrant_call(
                    "executeTransaction is already in progress for this wallet",
                ));
            }

            let digest = hashing::transaction_digest(
                chain_id,
                wallet_addr,
                request.target,
                request.value,
                &request.payload,
                request.mode,
                wallet.nonce(),
            );

            if !authorizer::verify_signatures(
                &digest,
                signatures,
                wallet.membership(),
                wallet.owners().len(),
                wallet.threshold(),
            ) {
                return Err(MultisigError::invalid_signatures(
                    "signature set does not meet the wallet threshold",
                ));
            }

            if request.mode == CallMode::Delegate {
                // Delegate dispatch runs against the wallet's own state
                // and moves no value
                if request.value > 0 {
                    return Err(MultisigError::invalid_input(
                        "delegate calls cannot carry value",
                    ));
                }
                if !wallet.is_trusted_delegate(request.target) {
                    return Err(MultisigError::untrusted_delegate(format!(
                        "{} is not a trusted delegate target",
                        request.target.to_hex()
                    )));
                }
            }
            if request.mode == CallMode::Call
                && request.value > 0
                && wallet_balance < request.value
            {
                return Err(MultisigError::insufficient_balance(format!(
                    "wallet holds {} but the call attaches {}",
                    wallet_balance, request.value
                )));
            }

            // Irrevocable from here: the execution slot is consumed before
            // control can transfer to external code, closing the replay
            // window a reentrant observer could otherwise exploit
            let consumed = wallet.nonce_ledger_mut().advance();
            wallet.set_executing(true);
            (digest, consumed)
        };

        let outcome = self.dispatch(wallet_addr, request);

        let wallet = self
            .wallets
            .get_mut(&wallet_addr)
            .ok_or_else(|| MultisigError::internal("wallet vanished during dispatch"))?;
        wallet.set_executing(false);
        wallet.record_event(WalletEvent::Executed {
            digest,
            target: request.target,
            value: request.value,
            mode: request.mode,
            nonce: consumed_nonce,
            success: outcome.success,
        });

        Ok(ExecutionReceipt {
            digest,
            nonce: consumed_nonce,
            success: outcome.success,
            return_data: outcome.return_data,
        })
    }

    fn dispatch(&mut self, wallet_addr: Address, request: &TransactionRequest) -> CallOutcome {
        match request.mode {
            CallMode::Call if request.target == wallet_addr => {
                // Self-call: the wallet invoking a privileged operation on
                // itself, the only path that satisfies the self-caller gate
                let Environment {
                    wallets,
                    registry,
                    balances,
                    ..
                } = self;
                match wallets.get_mut(&wallet_addr) {
                    Some(wallet) => ops::dispatch_self_operation(
                        wallet,
                        registry,
                        balances,
                        &request.payload,
                    ),
                    None => CallOutcome::failed("wallet missing during self-call"),
                }
            }
            CallMode::Call => self.dispatch_forward_call(wallet_addr, request),
            CallMode::Delegate => {
                let Environment {
                    wallets, delegates, ..
                } = self;
                let Some(wallet) = wallets.get_mut(&wallet_addr) else {
                    return CallOutcome::failed("wallet missing during delegate call");
                };
                match delegates.get(&request.target) {
                    // Delegate targets are pre-vetted, so their return data
                    // is passed through uncapped
                    Some(logic) => logic.execute(wallet, &request.payload),
                    None => CallOutcome::failed("no delegate logic installed at target"),
                }
            }
        }
    }

    fn dispatch_forward_call(
        &mut self,
        wallet_addr: Address,
        request: &TransactionRequest,
    ) -> CallOutcome {
        let ctx = CallContext {
            caller: wallet_addr,
            value: request.value,
            gas_allowance: CALL_GAS_ALLOWANCE,
        };

        match self.callees.remove(&request.target) {
            Some(mut callee) => {
                let mut outcome = callee.call(self, &ctx, &request.payload);
                self.callees.insert(request.target, callee);

                // Value settles only on success, keeping the sub-call
                // all-or-nothing without a refund path
                if outcome.success {
                    if let Err(e) = self.transfer(wallet_addr, request.target, request.value) {
                        outcome = CallOutcome::failed(e.to_string());
                    }
                }

                outcome.return_data.truncate(MAX_RETURN_DATA);
                outcome
            }
            None => {
                // No code at the target: an empty payload is a plain value
                // transfer, anything else has nothing to run against
                if request.payload.is_empty() {
                    match self.transfer(wallet_addr, request.target, request.value) {
                        Ok(()) => CallOutcome::ok(Vec::new()),
                        Err(e) => CallOutcome::failed(e.to_string()),
                    }
                } else {
                    CallOutcome::failed("no code at call target")
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
