//! Property-based tests for the hashing, authorization, and nonce invariants

use multisig_core::wallet::nonce::NonceLedger;
use multisig_core::wallet::owners::validate_owner_config;
use multisig_core::{
    keccak256, transaction_digest, verify_signatures, Address, CallContext, CallMode, CallOutcome,
    Callee, Environment, ImplementationRegistry, OwnerKey, Signature, TransactionRequest,
    MAX_RETURN_DATA,
};
use proptest::prelude::*;
use std::collections::HashSet;

const ADMIN: Address = Address([0xad; 20]);

fn addr(fill: u8) -> Address {
    Address([fill; 20])
}

fn sorted_keys(seeds: &[u8]) -> Vec<OwnerKey> {
    let mut keys: Vec<OwnerKey> = seeds
        .iter()
        .map(|&s| OwnerKey::from_bytes([s.max(1); 32]).expect("valid seed"))
        .collect();
    keys.sort_by_key(|k| k.address());
    keys.dedup_by_key(|k| k.address());
    keys
}

fn membership(keys: &[OwnerKey]) -> HashSet<Address> {
    keys.iter().map(|k| k.address()).collect()
}

fn sign_each(keys: &[&OwnerKey], digest: &[u8; 32]) -> Vec<Signature> {
    keys.iter()
        .map(|k| k.sign_digest(digest).expect("signing succeeds"))
        .collect()
}

/// Callee whose success and return size are driven by the payload
struct Scripted;
impl Callee for Scripted {
    fn call(&mut self, _env: &mut Environment, _ctx: &CallContext, payload: &[u8]) -> CallOutcome {
        match payload.first() {
            Some(&0) => CallOutcome::failed("scripted failure"),
            Some(&n) => CallOutcome::ok(vec![0xab; n as usize * 8]),
            None => CallOutcome::ok(Vec::new()),
        }
    }
}

fn env_with_wallet(keys: &[OwnerKey], threshold: usize) -> (Environment, Address) {
    let mut registry = ImplementationRegistry::new(addr(0xfa), ADMIN);
    registry
        .add_implementation(ADMIN, "v1", addr(0xc1))
        .expect("register v1");
    let mut env = Environment::new(1, registry);

    let owners: Vec<Address> = keys.iter().map(|k| k.address()).collect();
    let wallet = env
        .create_wallet(addr(0x11), &owners, threshold, "v1", &[0u8; 32])
        .expect("wallet deploys");
    env.register_callee(addr(0x42), Box::new(Scripted));
    (env, wallet)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every accepted execution consumes exactly one nonce slot, whether
    /// the callee succeeds or fails
    #[test]
    fn nonce_advances_once_per_accepted_execution(
        payloads in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..16), 1..6)
    ) {
        let keys = sorted_keys(&[1, 2, 3]);
        let (mut env, wallet) = env_with_wallet(&keys, 2);

        for (i, payload) in payloads.iter().enumerate() {
            let request = TransactionRequest::call(addr(0x42), 0, payload.clone());
            let digest = env.transaction_digest_for(wallet, &request).unwrap();
            let sigs = sign_each(&[&keys[0], &keys[1]], &digest);

            let receipt = env.execute_transaction(wallet, &request, &sigs).unwrap();
            prop_assert_eq!(receipt.nonce, i as u64);
            prop_assert_eq!(env.wallet(wallet).unwrap().nonce(), i as u64 + 1);
        }
    }

    /// CALL-mode return data never exceeds the cap, whatever the callee emits
    #[test]
    fn call_return_data_is_always_capped(size_byte in any::<u8>()) {
        let keys = sorted_keys(&[1, 2, 3]);
        let (mut env, wallet) = env_with_wallet(&keys, 2);

        let request = TransactionRequest::call(addr(0x42), 0, vec![size_byte.max(1)]);
        let digest = env.transaction_digest_for(wallet, &request).unwrap();
        let sigs = sign_each(&[&keys[0], &keys[1]], &digest);

        let receipt = env.execute_transaction(wallet, &request, &sigs).unwrap();
        let emitted = size_byte.max(1) as usize * 8;
        prop_assert_eq!(receipt.return_data.len(), emitted.min(MAX_RETURN_DATA));
    }

    /// An ascending signature set from any k distinct owners verifies, and
    /// duplicating any of its entries makes the whole set fail
    #[test]
    fn ascending_sets_verify_and_duplicates_break_them(
        seeds in proptest::collection::hash_set(1u8..=40, 2..6),
        dup_pick in any::<prop::sample::Index>(),
        digest_seed in any::<[u8; 16]>(),
    ) {
        let keys = sorted_keys(&seeds.into_iter().collect::<Vec<_>>());
        prop_assume!(keys.len() >= 2);
        let owners = membership(&keys);
        let threshold = keys.len();
        let digest = keccak256(&digest_seed);

        let refs: Vec<&OwnerKey> = keys.iter().collect();
        let sigs = sign_each(&refs, &digest);
        prop_assert!(verify_signatures(&digest, &sigs, &owners, keys.len(), threshold));

        let mut with_dup = sigs.clone();
        let i = dup_pick.index(sigs.len());
        with_dup.push(sigs[i].clone());
        prop_assert!(!verify_signatures(&digest, &with_dup, &owners, keys.len(), threshold));
    }

    /// Presenting the same valid signatures out of ascending order fails
    #[test]
    fn out_of_order_signatures_fail(
        swap in 0usize..2,
        digest_seed in any::<[u8; 16]>(),
    ) {
        let keys = sorted_keys(&[5, 9, 23]);
        let owners = membership(&keys);
        let digest = keccak256(&digest_seed);

        let refs: Vec<&OwnerKey> = keys.iter().collect();
        let mut sigs = sign_each(&refs, &digest);
        prop_assert!(verify_signatures(&digest, &sigs, &owners, 3, 3));

        sigs.swap(swap, swap + 1);
        prop_assert!(!verify_signatures(&digest, &sigs, &owners, 3, 3));
    }

    /// The digest binds every transaction field: changing any one of
    /// target, value, payload, mode, or nonce changes the digest
    #[test]
    fn digest_binds_all_fields(
        target in any::<[u8; 20]>(),
        value in any::<u128>(),
        payload in proptest::collection::vec(any::<u8>(), 0..32),
        nonce in any::<u64>(),
    ) {
        let wallet = addr(0xaa);
        let base = transaction_digest(1, wallet, Address(target), value, &payload, CallMode::Call, nonce);

        let mut other_target = target;
        other_target[0] ^= 1;
        prop_assert_ne!(
            base,
            transaction_digest(1, wallet, Address(other_target), value, &payload, CallMode::Call, nonce)
        );
        prop_assert_ne!(
            base,
            transaction_digest(1, wallet, Address(target), value ^ 1, &payload, CallMode::Call, nonce)
        );
        prop_assert_ne!(
            base,
            transaction_digest(1, wallet, Address(target), value, &payload, CallMode::Delegate, nonce)
        );
        prop_assert_ne!(
            base,
            transaction_digest(1, wallet, Address(target), value, &payload, CallMode::Call, nonce ^ 1)
        );
        prop_assert_ne!(
            base,
            transaction_digest(2, wallet, Address(target), value, &payload, CallMode::Call, nonce)
        );

        let mut other_payload = payload.clone();
        other_payload.push(0);
        prop_assert_ne!(
            base,
            transaction_digest(1, wallet, Address(target), value, &other_payload, CallMode::Call, nonce)
        );
    }

    /// Owner-config validation accepts exactly the sets satisfying the
    /// wallet invariant: non-empty, unique, non-zero, threshold in range
    #[test]
    fn owner_config_validation_matches_invariant(
        fills in proptest::collection::vec(any::<u8>(), 0..8),
        threshold in 0usize..10,
    ) {
        let owners: Vec<Address> = fills.iter().map(|&f| addr(f)).collect();
        let unique: HashSet<Address> = owners.iter().copied().collect();
        let invariant_holds = !owners.is_empty()
            && unique.len() == owners.len()
            && !owners.iter().any(|o| o.is_zero())
            && threshold > 0
            && threshold <= owners.len();

        prop_assert_eq!(
            validate_owner_config(&owners, threshold).is_ok(),
            invariant_holds
        );
    }

    /// Cancellation never moves the counter backward: a stale target
    /// fails and changes nothing, a valid one lands at target + 1
    #[test]
    fn nonce_cancellation_is_monotonic(advances in 0u64..20, target in 0u64..40) {
        let mut ledger = NonceLedger::new();
        for _ in 0..advances {
            ledger.advance();
        }

        match ledger.cancel_up_to(target) {
            Ok(resulting) => {
                prop_assert!(target >= advances);
                prop_assert_eq!(resulting, target + 1);
                prop_assert_eq!(ledger.current(), target + 1);
            }
            Err(_) => {
                prop_assert!(target < advances);
                prop_assert_eq!(ledger.current(), advances);
            }
        }
    }

    /// Checksummed rendering round-trips through parsing for any address
    #[test]
    fn checksum_rendering_round_trips(bytes in any::<[u8; 20]>()) {
        let address = Address(bytes);
        let rendered = address.to_checksum();
        prop_assert_eq!(rendered.parse::<Address>().unwrap(), address);
        prop_assert_eq!(Address::from_hex(&address.to_hex()).unwrap(), address);
    }
}
