//! Implementation registry and wallet factory
//!
//! A versioned catalog of deployable logic components with lifecycle
//! flags, plus the factory that deploys wallet instances bound to a
//! chosen component. One registry instance is shared by every wallet it
//! creates; all mutations are gated on the registry admin, transferable
//! only through a two-step propose/accept handover.
//!
//! Lifecycle per version: Active (usable for creation and upgrade),
//! Paused (blocks new deployments only, reversible), Deprecated (blocks
//! upgrades into the version, one-way), Removed (entry deleted).

use crate::error::{ErrorCode, MultisigError, MultisigResult};
use crate::hashing;
use crate::types::Address;
use crate::wallet::{owners, Wallet};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// =============================================================================
// Types
// =============================================================================

/// One registered logic component version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplementationInfo {
    /// Identity of the logic component itself
    pub component: Address,
    pub is_active: bool,
    pub is_paused: bool,
    pub is_deprecated: bool,
    pub added_at: u64,
    pub paused_at: Option<u64>,
    pub deprecated_at: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    WalletDeployed {
        wallet: Address,
        version: String,
        owner_count: usize,
        threshold: usize,
    },
    ImplementationAdded {
        version: String,
        component: Address,
    },
    ImplementationPaused {
        version: String,
    },
    ImplementationUnpaused {
        version: String,
    },
    ImplementationDeprecated {
        version: String,
    },
    ImplementationRemoved {
        version: String,
        component: Address,
    },
    LatestVersionChanged {
        old: Option<String>,
        new: Option<String>,
    },
    AdminProposed {
        proposed: Address,
    },
    AdminChanged {
        old: Address,
        new: Address,
    },
}

/// The shared version catalog and wallet factory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplementationRegistry {
    address: Address,
    admin: Address,
    pending_admin: Option<Address>,
    implementations: HashMap<String, ImplementationInfo>,
    all_versions: Vec<String>,
    latest_version: Option<String>,
    deployed_wallets: Vec<Address>,
    is_wallet_deployed: HashSet<Address>,
    events: Vec<RegistryEvent>,
}

impl ImplementationRegistry {
    /// Create an admin-seeded registry
    pub fn new(address: Address, admin: Address) -> Self {
        Self {
            address,
            admin,
            pending_admin: None,
            implementations: HashMap::new(),
            all_versions: Vec::new(),
            latest_version: None,
            deployed_wallets: Vec::new(),
            is_wallet_deployed: HashSet::new(),
            events: Vec::new(),
        }
    }

    // =========================================================================
    // Observable state surface
    // =========================================================================

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn pending_admin(&self) -> Option<Address> {
        self.pending_admin
    }

    pub fn implementation(&self, version: &str) -> Option<&ImplementationInfo> {
        self.implementations.get(version)
    }

    /// Known version labels in registration order
    pub fn all_versions(&self) -> &[String] {
        &self.all_versions
    }

    pub fn latest_version(&self) -> Option<&str> {
        self.latest_version.as_deref()
    }

    pub fn deployed_wallets(&self) -> &[Address] {
        &self.deployed_wallets
    }

    pub fn is_wallet_deployed(&self, wallet: Address) -> bool {
        self.is_wallet_deployed.contains(&wallet)
    }

    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Usable for new deployments: Active and not Paused
    pub fn usable_for_deployment(&self, version: &str) -> bool {
        self.implementations
            .get(version)
            .map(|info| info.is_active && !info.is_paused)
            .unwrap_or(false)
    }

    /// Usable as an upgrade target: Active and not Deprecated.
    ///
    /// Pausing only blocks new deployments; wallets may still upgrade
    /// onto a paused version.
    pub fn usable_for_upgrade(&self, version: &str) -> bool {
        self.implementations
            .get(version)
            .map(|info| info.is_active && !info.is_deprecated)
            .unwrap_or(false)
    }

    // =========================================================================
    // Admin-gated mutations
    // =========================================================================

    fn require_admin(&self, caller: Address) -> MultisigResult<()> {
        if caller != self.admin {
            return Err(MultisigError::unauthorized(
                "caller does not hold the registry admin capability",
            ));
        }
        Ok(())
    }

    /// Register a new logic component version; it starts Active and
    /// becomes the latest version.
    pub fn add_implementation(
        &mut self,
        caller: Address,
        version: &str,
        component: Address,
    ) -> MultisigResult<()> {
        self.require_admin(caller)?;
        if version.is_empty() {
            return Err(MultisigError::invalid_input("version label is empty"));
        }
        if component.is_zero() {
            return Err(MultisigError::invalid_input(
                "component is the zero address",
            ));
        }
        if self.implementations.contains_key(version) {
            return Err(MultisigError::new(
                ErrorCode::VersionExists,
                format!("version {} already registered", version),
            ));
        }

        self.implementations.insert(
            version.to_string(),
            ImplementationInfo {
                component,
                is_active: true,
                is_paused: false,
                is_deprecated: false,
                added_at: current_timestamp(),
                paused_at: None,
                deprecated_at: None,
            },
        );
        self.all_versions.push(version.to_string());
        self.record_event(RegistryEvent::ImplementationAdded {
            version: version.to_string(),
            component,
        });
        self.set_latest_pointer(Some(version.to_string()));
        Ok(())
    }

    /// Block new deployments on a version; existing wallets keep running
    pub fn pause_implementation(&mut self, caller: Address, version: &str) -> MultisigResult<()> {
        self.require_admin(caller)?;
        let info = self.lookup_mut(version)?;
        if info.is_paused {
            return Err(MultisigError::invalid_input(format!(
                "version {} is already paused",
                version
            )));
        }
        info.is_paused = true;
        info.paused_at = Some(current_timestamp());
        self.record_event(RegistryEvent::ImplementationPaused {
            version: version.to_string(),
        });
        Ok(())
    }

    /// Reverse a pause
    pub fn unpause_implementation(&mut self, caller: Address, version: &str) -> MultisigResult<()> {
        self.require_admin(caller)?;
        let info = self.lookup_mut(version)?;
        if !info.is_paused {
            return Err(MultisigError::invalid_input(format!(
                "version {} is not paused",
                version
            )));
        }
        info.is_paused = false;
        info.paused_at = None;
        self.record_event(RegistryEvent::ImplementationUnpaused {
            version: version.to_string(),
        });
        Ok(())
    }

    /// Permanently exclude a version as an upgrade target.
    ///
    /// Wallets already running it are unaffected.
    pub fn deprecate_implementation(
        &mut self,
        caller: Address,
        version: &str,
    ) -> MultisigResult<()> {
        self.require_admin(caller)?;
        let info = self.lookup_mut(version)?;
        if info.is_deprecated {
            return Err(MultisigError::invalid_input(format!(
                "version {} is already deprecated",
                version
            )));
        }
        info.is_deprecated = true;
        info.deprecated_at = Some(current_timestamp());
        self.record_event(RegistryEvent::ImplementationDeprecated {
            version: version.to_string(),
        });
        Ok(())
    }

    /// Delete a version from the catalog entirely
    pub fn remove_implementation(&mut self, caller: Address, version: &str) -> MultisigResult<()> {
        self.require_admin(caller)?;
        let info = self.implementations.remove(version).ok_or_else(|| {
            MultisigError::unknown_version(format!("unknown version {}", version))
        })?;
        self.all_versions.retain(|v| v != version);
        self.record_event(RegistryEvent::ImplementationRemoved {
            version: version.to_string(),
            component: info.component,
        });
        if self.latest_version.as_deref() == Some(version) {
            self.set_latest_pointer(None);
        }
        Ok(())
    }

    /// Point the latest-version marker at a known version
    pub fn set_latest_version(&mut self, caller: Address, version: &str) -> MultisigResult<()> {
        self.require_admin(caller)?;
        if !self.implementations.contains_key(version) {
            return Err(MultisigError::unknown_version(format!(
                "unknown version {}",
                version
            )));
        }
        self.set_latest_pointer(Some(version.to_string()));
        Ok(())
    }

    /// Step one of the admin handover: name a successor
    pub fn propose_admin(&mut self, caller: Address, new_admin: Address) -> MultisigResult<()> {
        self.require_admin(caller)?;
        if new_admin.is_zero() {
            return Err(MultisigError::invalid_input(
                "proposed admin is the zero address",
            ));
        }
        self.pending_admin = Some(new_admin);
        self.record_event(RegistryEvent::AdminProposed {
            proposed: new_admin,
        });
        Ok(())
    }

    /// Step two: the proposed successor claims the capability
    pub fn accept_admin(&mut self, caller: Address) -> MultisigResult<()> {
        if self.pending_admin != Some(caller) {
            return Err(MultisigError::unauthorized(
                "caller is not the proposed admin",
            ));
        }
        let old = std::mem::replace(&mut self.admin, caller);
        self.pending_admin = None;
        self.record_event(RegistryEvent::AdminChanged { old, new: caller });
        Ok(())
    }

    // =========================================================================
    // Wallet creation
    // =========================================================================

    /// Deterministic wallet address from a caller-supplied salt.
    ///
    /// keccak256(0xff || registry || keccak(caller || salt) || keccak(version)),
    /// last 20 bytes. Folding the caller in keeps the same salt from
    /// different callers from ever colliding.
    pub fn derive_wallet_address(
        &self,
        caller: Address,
        salt: &[u8; 32],
        version: &str,
    ) -> Address {
        let mut inner = Vec::with_capacity(64);
        inner.extend_from_slice(&hashing::pad_address(caller));
        inner.extend_from_slice(salt);
        let salt_hash = hashing::keccak256(&inner);

        let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
        preimage.push(0xff);
        preimage.extend_from_slice(self.address.as_bytes());
        preimage.extend_from_slice(&salt_hash);
        preimage.extend_from_slice(&hashing::keccak256(version.as_bytes()));

        let hash = hashing::keccak256(&preimage);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash[12..32]);
        Address(out)
    }

    /// Validate configuration, deploy a new wallet bound to `version`,
    /// and record it in the deployed-wallet log.
    pub fn create_wallet(
        &mut self,
        caller: Address,
        owners: &[Address],
        threshold: usize,
        version: &str,
        salt: &[u8; 32],
    ) -> MultisigResult<Wallet> {
        owners::validate_owner_config(owners, threshold)?;
        if !self.usable_for_deployment(version) {
            return Err(MultisigError::implementation_not_usable(format!(
                "version {} is not usable for deployment",
                version
            )));
        }

        let address = self.derive_wallet_address(caller, salt, version);
        if self.is_wallet_deployed.contains(&address) {
            return Err(MultisigError::new(
                ErrorCode::AddressCollision,
                format!("wallet already deployed at {}", address.to_hex()),
            ));
        }

        let wallet = Wallet::new(
            address,
            self.address,
            owners.to_vec(),
            threshold,
            version.to_string(),
        );

        self.deployed_wallets.push(address);
        self.is_wallet_deployed.insert(address);
        self.record_event(RegistryEvent::WalletDeployed {
            wallet: address,
            version: version.to_string(),
            owner_count: owners.len(),
            threshold,
        });
        Ok(wallet)
    }

    // =========================================================================
    // Private methods
    // =========================================================================

    fn lookup_mut(&mut self, version: &str) -> MultisigResult<&mut ImplementationInfo> {
        self.implementations.get_mut(version).ok_or_else(|| {
            MultisigError::unknown_version(format!("unknown version {}", version))
        })
    }

    fn set_latest_pointer(&mut self, new: Option<String>) {
        if self.latest_version == new {
            return;
        }
        let old = std::mem::replace(&mut self.latest_version, new.clone());
        self.record_event(RegistryEvent::LatestVersionChanged { old, new });
    }

    fn record_event(&mut self, event: RegistryEvent) {
        self.events.push(event);
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn addr(fill: u8) -> Address {
        Address([fill; 20])
    }

    const ADMIN: Address = Address([0xad; 20]);

    fn registry() -> ImplementationRegistry {
        let mut r = ImplementationRegistry::new(addr(0xfa), ADMIN);
        r.add_implementation(ADMIN, "v1", addr(0xc1)).unwrap();
        r
    }

    #[test]
    fn test_add_sets_active_and_latest() {
        let r = registry();
        let info = r.implementation("v1").unwrap();
        assert!(info.is_active && !info.is_paused && !info.is_deprecated);
        assert_eq!(r.latest_version(), Some("v1"));
        assert_eq!(r.all_versions(), &["v1".to_string()]);
        assert!(r.usable_for_deployment("v1"));
        assert!(r.usable_for_upgrade("v1"));
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let mut r = registry();
        assert!(r.add_implementation(ADMIN, "", addr(0xc2)).is_err());
        assert!(r.add_implementation(ADMIN, "v2", Address::ZERO).is_err());
        let err = r.add_implementation(ADMIN, "v1", addr(0xc2)).unwrap_err();
        assert_eq!(err.code, ErrorCode::VersionExists);
    }

    #[test]
    fn test_non_admin_mutations_rejected() {
        let mut r = registry();
        let outsider = addr(0x99);
        assert!(r.add_implementation(outsider, "v2", addr(0xc2)).is_err());
        assert!(r.pause_implementation(outsider, "v1").is_err());
        assert!(r.remove_implementation(outsider, "v1").is_err());
        assert!(r.propose_admin(outsider, outsider).is_err());
    }

    #[test]
    fn test_pause_blocks_deployment_only() {
        let mut r = registry();
        r.pause_implementation(ADMIN, "v1").unwrap();

        // Paused versions take no new deployments but stay upgradeable
        assert!(!r.usable_for_deployment("v1"));
        assert!(r.usable_for_upgrade("v1"));
        assert!(r.implementation("v1").unwrap().paused_at.is_some());

        r.unpause_implementation(ADMIN, "v1").unwrap();
        assert!(r.usable_for_deployment("v1"));
        assert!(r.implementation("v1").unwrap().paused_at.is_none());

        // Deprecation on top of a pause removes upgrade eligibility
        r.pause_implementation(ADMIN, "v1").unwrap();
        r.deprecate_implementation(ADMIN, "v1").unwrap();
        assert!(!r.usable_for_upgrade("v1"));
    }

    #[test]
    fn test_deprecate_blocks_upgrade_only() {
        let mut r = registry();
        r.deprecate_implementation(ADMIN, "v1").unwrap();

        // Still deployable, no longer an upgrade target
        assert!(r.usable_for_deployment("v1"));
        assert!(!r.usable_for_upgrade("v1"));

        // One-way
        assert!(r.deprecate_implementation(ADMIN, "v1").is_err());
    }

    #[test]
    fn test_remove_clears_both_structures_and_latest() {
        let mut r = registry();
        r.add_implementation(ADMIN, "v2", addr(0xc2)).unwrap();
        assert_eq!(r.latest_version(), Some("v2"));

        r.remove_implementation(ADMIN, "v2").unwrap();
        assert!(r.implementation("v2").is_none());
        assert!(!r.all_versions().contains(&"v2".to_string()));
        assert_eq!(r.latest_version(), None);

        // v1 survives and can become latest again
        r.set_latest_version(ADMIN, "v1").unwrap();
        assert_eq!(r.latest_version(), Some("v1"));
    }

    #[test]
    fn test_two_step_admin_handover() {
        let mut r = registry();
        let successor = addr(0x55);

        // Nobody can accept before a proposal
        assert!(r.accept_admin(successor).is_err());

        r.propose_admin(ADMIN, successor).unwrap();
        assert_eq!(r.pending_admin(), Some(successor));

        // Only the proposed successor may accept
        assert!(r.accept_admin(addr(0x66)).is_err());
        r.accept_admin(successor).unwrap();
        assert_eq!(r.admin(), successor);
        assert_eq!(r.pending_admin(), None);

        // Old admin lost the capability
        assert!(r.add_implementation(ADMIN, "v2", addr(0xc2)).is_err());
        assert!(r.add_implementation(successor, "v2", addr(0xc2)).is_ok());
    }

    #[test]
    fn test_create_wallet_happy_path() {
        let mut r = registry();
        let owners = [addr(1), addr(2), addr(3)];
        let wallet = r
            .create_wallet(addr(0x11), &owners, 2, "v1", &[0u8; 32])
            .unwrap();

        assert_eq!(wallet.factory(), r.address());
        assert_eq!(wallet.version(), "v1");
        assert_eq!(wallet.threshold(), 2);
        assert!(r.is_wallet_deployed(wallet.address()));
        assert_eq!(r.deployed_wallets(), &[wallet.address()]);
    }

    #[test]
    fn test_create_wallet_validation() {
        let mut r = registry();
        let owners = [addr(1), addr(2)];

        let err = r
            .create_wallet(addr(0x11), &owners, 3, "v1", &[0u8; 32])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOwnerConfig);

        let err = r
            .create_wallet(addr(0x11), &owners, 2, "v9", &[0u8; 32])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ImplementationNotUsable);

        r.pause_implementation(ADMIN, "v1").unwrap();
        let err = r
            .create_wallet(addr(0x11), &owners, 2, "v1", &[0u8; 32])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ImplementationNotUsable);
    }

    #[test]
    fn test_create_wallet_salt_collision() {
        let mut r = registry();
        let owners = [addr(1), addr(2)];

        r.create_wallet(addr(0x11), &owners, 2, "v1", &[7u8; 32])
            .unwrap();
        let err = r
            .create_wallet(addr(0x11), &owners, 2, "v1", &[7u8; 32])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AddressCollision);

        // Same salt, different caller: distinct address, no collision
        assert!(r
            .create_wallet(addr(0x22), &owners, 2, "v1", &[7u8; 32])
            .is_ok());
    }

    #[test]
    fn test_address_derivation_deterministic() {
        let r = registry();
        let a = r.derive_wallet_address(addr(0x11), &[7u8; 32], "v1");
        let b = r.derive_wallet_address(addr(0x11), &[7u8; 32], "v1");
        assert_eq!(a, b);

        assert_ne!(a, r.derive_wallet_address(addr(0x22), &[7u8; 32], "v1"));
        assert_ne!(a, r.derive_wallet_address(addr(0x11), &[8u8; 32], "v1"));
        assert_ne!(a, r.derive_wallet_address(addr(0x11), &[7u8; 32], "v2"));
    }
}
