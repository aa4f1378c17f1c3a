//! Owner set validation
//!
//! Shared rules for wallet owner configuration, used both by the factory
//! at creation time and by the wallet when owners are replaced.

use crate::error::{MultisigError, MultisigResult};
use crate::types::{Address, MAX_OWNERS};
use std::collections::HashSet;

/// Validate an owner set and threshold without touching any state.
///
/// Rules: non-empty, at most `MAX_OWNERS` entries, no zero address, no
/// duplicates, and `0 < threshold <= owners.len()`.
pub fn validate_owner_config(owners: &[Address], threshold: usize) -> MultisigResult<()> {
    if owners.is_empty() {
        return Err(MultisigError::invalid_owner_config("owner set is empty"));
    }
    if owners.len() > MAX_OWNERS {
        return Err(MultisigError::invalid_owner_config(format!(
            "owner set has {} entries, maximum is {}",
            owners.len(),
            MAX_OWNERS
        )));
    }

    let mut seen = HashSet::with_capacity(owners.len());
    for owner in owners {
        if owner.is_zero() {
            return Err(MultisigError::invalid_owner_config(
                "owner set contains the zero address",
            ));
        }
        if !seen.insert(*owner) {
            return Err(MultisigError::invalid_owner_config(format!(
                "duplicate owner {}",
                owner.to_hex()
            )));
        }
    }

    if threshold == 0 || threshold > owners.len() {
        return Err(MultisigError::invalid_owner_config(format!(
            "threshold {} out of range 1..={}",
            threshold,
            owners.len()
        )));
    }

    Ok(())
}

/// Build the membership index for a validated owner set
pub fn build_membership(owners: &[Address]) -> HashSet<Address> {
    owners.iter().copied().collect()
}
