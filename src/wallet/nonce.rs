//! Replay-protection nonce ledger
//!
//! The monotonically advancing execution counter every transaction digest
//! is bound to. Normal execution advances it by exactly one; cooperative
//! cancellation can jump it forward, never backward.

use crate::error::{MultisigError, MultisigResult};
use serde::{Deserialize, Serialize};

/// Per-wallet execution counter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NonceLedger {
    value: u64,
}

impl NonceLedger {
    pub fn new() -> Self {
        Self { value: 0 }
    }

    /// The nonce the next transaction must be signed against
    pub fn current(&self) -> u64 {
        self.value
    }

    /// Consume the current slot; returns the nonce that was consumed
    pub fn advance(&mut self) -> u64 {
        let consumed = self.value;
        self.value += 1;
        consumed
    }

    /// Invalidate every execution slot up to and including `target`.
    ///
    /// Fails if `target` is below the current counter; otherwise the
    /// counter becomes `target + 1`, so any transaction pre-signed against
    /// a nonce <= `target` can never verify again.
    pub fn cancel_up_to(&mut self, target: u64) -> MultisigResult<u64> {
        if target < self.value {
            return Err(MultisigError::stale_nonce_target(format!(
                "cancel target {} is below current nonce {}",
                target, self.value
            )));
        }
        self.value = target + 1;
        Ok(self.value)
    }
}
