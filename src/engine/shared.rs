//! Thread-safe handle over a [`StakingClaim`]
//!
//! Executions are serialised by a writer mutex, so at most one call is ever
//! validating. Validation runs under the state's read lock; the write lock
//! is taken only for the infallible commit. Readers therefore never wait on
//! signature recovery, and every read observes either all or none of an
//! execution's effects.

use crate::claim::ClaimData;
use crate::engine::error::EngineError;
use crate::engine::events::{Event, ExecutionReceipt};
use crate::engine::staking_claim::StakingClaim;
use crate::multisig::OWNER_COUNT;
use alloy_primitives::{Address, Selector, B256};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Cloneable, concurrently usable engine handle
#[derive(Clone)]
pub struct SharedStakingClaim {
    inner: Arc<Inner>,
}

struct Inner {
    writer: Mutex<()>,
    state: RwLock<StakingClaim>,
}

impl SharedStakingClaim {
    pub fn new(engine: StakingClaim) -> Self {
        Self {
            inner: Arc::new(Inner {
                writer: Mutex::new(()),
                state: RwLock::new(engine),
            }),
        }
    }

    /// Serialised [`StakingClaim::execute`]
    pub fn execute(
        &self,
        caller: Address,
        selector: Selector,
        input_data: &[u8],
        signatures: &[u8],
    ) -> Result<ExecutionReceipt, EngineError> {
        let _writer = self.inner.writer.lock();

        // No other writer can run while we hold the mutex, so the plan
        // cannot go stale between the read and write sections.
        let prepared = self
            .inner
            .state
            .read()
            .prepare(caller, selector, input_data, signatures)?;

        Ok(self.inner.state.write().commit(prepared))
    }

    pub fn call(
        &self,
        caller: Address,
        selector: Selector,
        input_data: &[u8],
    ) -> Result<Vec<Event>, EngineError> {
        self.inner.state.read().call(caller, selector, input_data)
    }

    pub fn get_nonce(&self, selector: &Selector) -> u64 {
        self.inner.state.read().get_nonce(selector)
    }

    pub fn get_owners(&self) -> [Address; OWNER_COUNT] {
        self.inner.state.read().get_owners()
    }

    pub fn is_owner(&self, account: &Address) -> bool {
        self.inner.state.read().is_owner(account)
    }

    pub fn get_base_token(&self) -> Address {
        self.inner.state.read().get_base_token()
    }

    pub fn get_claim_data(&self, claimant: &Address, access_key: &B256) -> ClaimData {
        self.inner.state.read().get_claim_data(claimant, access_key)
    }

    pub fn hash_typed_call(&self, selector: Selector, input_data: &[u8]) -> B256 {
        self.inner.state.read().hash_typed_call(selector, input_data)
    }

    pub fn recover_signer(
        &self,
        digest: &B256,
        signatures: &[u8],
    ) -> Result<Vec<Address>, EngineError> {
        self.inner.state.read().recover_signer(digest, signatures)
    }

    /// Copy of the current state, e.g. for persisting
    pub fn snapshot(&self) -> StakingClaim {
        self.inner.state.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::typed_data::Domain;
    use crate::crypto::{combine_signatures, KeyPair};
    use crate::engine::operation::{ClaimInput, Operation};
    use crate::engine::staking_claim::InitParams;
    use alloy_primitives::U256;
    use std::thread;

    fn setup() -> (SharedStakingClaim, Vec<KeyPair>) {
        let owners: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        let engine = StakingClaim::initialize(InitParams {
            admin: Address::repeat_byte(0xad),
            owners: [owners[0].address(), owners[1].address(), owners[2].address()],
            base_token: Address::repeat_byte(0xb0),
            domain: Domain::new(1, Address::repeat_byte(0xc0)),
        })
        .unwrap();
        (SharedStakingClaim::new(engine), owners)
    }

    fn signed_blob(shared: &SharedStakingClaim, owners: &[KeyPair], op: &Operation) -> Vec<u8> {
        let digest = shared.hash_typed_call(op.selector(), &op.encode_input());
        let sigs: Vec<_> = owners.iter().map(|k| k.sign_digest(&digest)).collect();
        combine_signatures(&sigs)
    }

    #[test]
    fn test_execute_through_handle() {
        let (shared, owners) = setup();
        let amount = U256::from(1_000_000_000u64);
        let claim = ClaimInput::new(Address::repeat_byte(1), 1_725_148_800, amount).unwrap();
        let op = Operation::CreateClaimData(claim);
        let blob = signed_blob(&shared, &owners, &op);

        let receipt = shared
            .execute(owners[1].address(), op.selector(), &op.encode_input(), &blob)
            .unwrap();
        assert_eq!(receipt.nonce, 0);
        assert_eq!(shared.get_nonce(&op.selector()), 1);
        assert_eq!(
            shared
                .get_claim_data(&claim.claimant, &claim.access_key)
                .amount,
            amount
        );
    }

    #[test]
    fn test_racing_executions_with_same_nonce() {
        // Several relayers submit differently-signed calls all made at nonce 0;
        // exactly one can win, the rest see stale signatures.
        let (shared, owners) = setup();

        let submissions: Vec<_> = (1..=4u8)
            .map(|i| {
                let op = Operation::CreateClaimData(
                    ClaimInput::new(Address::repeat_byte(i), 100, U256::from(i)).unwrap(),
                );
                let blob = signed_blob(&shared, &owners, &op);
                (op, blob)
            })
            .collect();

        let handles: Vec<_> = submissions
            .into_iter()
            .map(|(op, blob)| {
                let shared = shared.clone();
                let caller = owners[0].address();
                thread::spawn(move || shared.execute(caller, op.selector(), &op.encode_input(), &blob))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = results.iter().filter(|r| r.is_ok()).count();

        assert_eq!(wins, 1);
        for result in results.iter().filter(|r| r.is_err()) {
            assert!(matches!(result, Err(EngineError::UnauthorizedSigner(_))));
        }
        let selector = crate::engine::OperationKind::CreateClaimData.selector();
        assert_eq!(shared.get_nonce(&selector), 1);
        assert_eq!(shared.snapshot().claims().len(), 1);
    }

    #[test]
    fn test_reads_during_executions() {
        let (shared, owners) = setup();
        let reader = {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let owners = shared.get_owners();
                    assert!(owners.iter().all(|o| shared.is_owner(o)));
                }
            })
        };

        for i in 0..5u64 {
            let op = Operation::CreateClaimData(
                ClaimInput::new(Address::repeat_byte(7), 1_000 + i, U256::from(1)).unwrap(),
            );
            let blob = signed_blob(&shared, &owners, &op);
            shared
                .execute(owners[2].address(), op.selector(), &op.encode_input(), &blob)
                .unwrap();
        }

        reader.join().unwrap();
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.claims().len(), 5);
        assert_eq!(snapshot.claims().claims_for(&Address::repeat_byte(7)).len(), 5);
    }
}
