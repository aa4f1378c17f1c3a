//! Boolean membership whitelists
//!
//! Two independent instances gate dangerous operation targets: trusted
//! delegate targets and emergency-withdrawal recipients.

use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A flat membership map over addresses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Whitelist {
    entries: HashSet<Address>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, address: Address) -> bool {
        self.entries.contains(&address)
    }

    /// Set membership; returns true if the map actually changed
    pub fn set(&mut self, address: Address, allowed: bool) -> bool {
        if allowed {
            self.entries.insert(address)
        } else {
            self.entries.remove(&address)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enumerate entries in a deterministic (sorted) order
    pub fn entries(&self) -> Vec<Address> {
        let mut out: Vec<Address> = self.entries.iter().copied().collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(fill: u8) -> Address {
        Address([fill; 20])
    }

    #[test]
    fn test_set_and_contains() {
        let mut list = Whitelist::new();
        assert!(!list.contains(addr(1)));

        assert!(list.set(addr(1), true));
        assert!(list.contains(addr(1)));

        // Idempotent insert reports no change
        assert!(!list.set(addr(1), true));
    }

    #[test]
    fn test_revoke() {
        let mut list = Whitelist::new();
        list.set(addr(1), true);

        assert!(list.set(addr(1), false));
        assert!(!list.contains(addr(1)));
        assert!(!list.set(addr(1), false));
    }

    #[test]
    fn test_entries_sorted() {
        let mut list = Whitelist::new();
        list.set(addr(9), true);
        list.set(addr(1), true);
        list.set(addr(5), true);

        assert_eq!(list.entries(), vec![addr(1), addr(5), addr(9)]);
    }
}
