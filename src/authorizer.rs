//! Ordered k-of-n signature authorization
//!
//! Verifies that a signature set approves a transaction digest under the
//! wallet's current owner set and threshold. Recognized signer identities
//! must arrive in strictly ascending address order, which rejects
//! duplicates in a single pass without an auxiliary set.

use crate::signing;
use crate::types::{Address, Signature};
use std::collections::HashSet;

/// Check whether `signatures` approve `digest` under the given owner set.
///
/// Rules:
/// - fewer signatures than the threshold, or more than the owner count,
///   fail outright;
/// - a signature that does not recover to a current owner is skipped and
///   counts for nothing;
/// - recognized identities must be strictly ascending; the first
///   out-of-order recognized identity fails the whole check;
/// - approval requires at least `threshold` recognized identities.
pub fn verify_signatures(
    digest: &[u8; 32],
    signatures: &[Signature],
    is_owner: &HashSet<Address>,
    owner_count: usize,
    threshold: usize,
) -> bool {
    if threshold == 0 {
        return false;
    }
    if signatures.len() < threshold || signatures.len() > owner_count {
        return false;
    }

    let mut recognized = 0usize;
    let mut last_signer: Option<Address> = None;

    for signature in signatures {
        // Recovery failures behave like unrecognized identities
        let signer = match signing::recover_signer(digest, signature) {
            Ok(addr) => addr,
            Err(_) => continue,
        };

        if !is_owner.contains(&signer) {
            continue;
        }

        if let Some(previous) = last_signer {
            if signer <= previous {
                return false;
            }
        }

        last_signer = Some(signer);
        recognized += 1;
    }

    recognized >= threshold
}

// =============================================================================
// Tests
// =============================================================================
