//! Threshold-multisig execution engine
//!
//! `execute` runs in two phases:
//!
//! 1. **prepare** (read-only): authenticate the caller, split the signature
//!    blob, rebuild the digest at the current nonce, recover the three
//!    signers, reject duplicates and non-owners, decode the operation and
//!    check it against current state.
//! 2. **commit** (infallible): advance the nonce, then apply the operation
//!    and collect its events.
//!
//! Every rejection happens in phase 1, so a failed call leaves no trace.

use crate::claim::{ClaimData, ClaimRegistry};
use crate::core::typed_data::Domain;
use crate::crypto::{recover_signers, split_signatures};
use crate::engine::error::EngineError;
use crate::engine::events::{Event, ExecutionReceipt};
use crate::engine::operation::{ClaimInput, Operation, OperationKind};
use crate::multisig::{NonceStore, OwnerChange, OwnerRegistry, OWNER_COUNT};
use alloy_primitives::{Address, Selector, B256};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Signatures required per execution
pub const REQUIRED_SIGNATURES: usize = OWNER_COUNT;

/// One-time initialization parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitParams {
    /// Upgrade authority of the hosting container
    pub admin: Address,
    pub owners: [Address; OWNER_COUNT],
    /// External ledger the claim amounts are denominated in
    pub base_token: Address,
    pub domain: Domain,
}

/// Proof that the current call entered through the dispatcher
///
/// Only `commit` can build one, so the whitelisted operations below cannot
/// be reached from anywhere else.
pub(crate) struct DispatchContext {
    _private: (),
}

/// Operation validated against state, ready to apply
#[derive(Debug)]
enum Plan {
    CreateClaimData(ClaimInput),
    CreateClaimDataMultiple(Vec<ClaimInput>),
    ChangeOwner { slot: usize, change: OwnerChange },
}

/// Fully validated execution awaiting commit
#[derive(Debug)]
pub(crate) struct PreparedExecution {
    selector: Selector,
    nonce: u64,
    signers: Vec<Address>,
    plan: Plan,
}

/// The engine state: owners, nonces and claims under one signing domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingClaim {
    domain: Domain,
    admin: Address,
    base_token: Address,
    owners: OwnerRegistry,
    nonces: NonceStore,
    claims: ClaimRegistry,
}

impl StakingClaim {
    /// Initialize a new engine
    ///
    /// # Errors
    /// `DuplicateSigner` if two owners coincide, `NoZeroAddress` for a zero
    /// admin, owner, base token or verifying address, `InvalidDomain` for a
    /// zero chain id or empty name/version.
    pub fn initialize(params: InitParams) -> Result<Self, EngineError> {
        check_config(&params.admin, &params.base_token, &params.domain)?;
        let owners = OwnerRegistry::new(params.owners)?;

        log::info!(
            "StakingClaim initialized: chain {}, instance {}, base token {}",
            params.domain.chain_id,
            params.domain.verifying_contract,
            params.base_token
        );

        Ok(Self {
            domain: params.domain,
            admin: params.admin,
            base_token: params.base_token,
            owners,
            nonces: NonceStore::new(),
            claims: ClaimRegistry::new(),
        })
    }

    /// Re-run the construction checks on a state built some other way,
    /// e.g. deserialized from a snapshot
    ///
    /// The owner set validates itself while deserializing.
    pub fn validate(&self) -> Result<(), EngineError> {
        check_config(&self.admin, &self.base_token, &self.domain)
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Authenticate and run one multisig-authorized operation
    pub fn execute(
        &mut self,
        caller: Address,
        selector: Selector,
        input_data: &[u8],
        signatures: &[u8],
    ) -> Result<ExecutionReceipt, EngineError> {
        let prepared = self.prepare(caller, selector, input_data, signatures)?;
        Ok(self.commit(prepared))
    }

    /// Validation phase; never mutates
    pub(crate) fn prepare(
        &self,
        caller: Address,
        selector: Selector,
        input_data: &[u8],
        signatures: &[u8],
    ) -> Result<PreparedExecution, EngineError> {
        let result = self.authenticate(caller, selector, input_data, signatures);
        if let Err(err) = &result {
            log::warn!("Execution of {} by {} rejected: {}", selector, caller, err);
        }
        result
    }

    fn authenticate(
        &self,
        caller: Address,
        selector: Selector,
        input_data: &[u8],
        signatures: &[u8],
    ) -> Result<PreparedExecution, EngineError> {
        if !self.owners.is_owner(&caller) {
            return Err(EngineError::CallerIsNotOwner(caller));
        }

        let records = split_signatures(signatures)?;
        if records.len() != REQUIRED_SIGNATURES {
            return Err(EngineError::InvalidSignatureLength(signatures.len()));
        }

        let nonce = self.nonces.current(&selector);
        let digest = self.domain.hash_typed_call(nonce, selector, input_data);
        log::debug!("Digest for {} at nonce {}: {}", selector, nonce, digest);

        let signers = records
            .iter()
            .map(|record| record.recover(&digest))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("Recovered signers: {:?}", signers);

        for (i, signer) in signers.iter().enumerate() {
            if signers[i + 1..].contains(signer) {
                return Err(EngineError::DuplicateSigner);
            }
        }

        if let Some(signer) = signers.iter().find(|s| !self.owners.is_owner(s)) {
            return Err(EngineError::UnauthorizedSigner(*signer));
        }

        let operation = Operation::decode(selector, input_data)?;
        let plan = self.plan(operation)?;

        Ok(PreparedExecution {
            selector,
            nonce,
            signers,
            plan,
        })
    }

    /// Check an operation against current state
    fn plan(&self, operation: Operation) -> Result<Plan, EngineError> {
        match operation {
            Operation::CreateClaimData(claim) => {
                self.claims.ensure_vacant(&claim.claimant, &claim.access_key)?;
                Ok(Plan::CreateClaimData(claim))
            }
            Operation::CreateClaimDataMultiple(claims) => {
                let mut seen = HashSet::with_capacity(claims.len());
                for claim in &claims {
                    self.claims.ensure_vacant(&claim.claimant, &claim.access_key)?;
                    // A repeat inside the batch would overwrite its own earlier entry
                    if !seen.insert((claim.claimant, claim.access_key)) {
                        return Err(EngineError::OverwritingClaim {
                            claimant: claim.claimant,
                            access_key: claim.access_key,
                        });
                    }
                }
                Ok(Plan::CreateClaimDataMultiple(claims))
            }
            Operation::ChangeOwner(change) => {
                let slot = self
                    .owners
                    .check_replace(&change.old_owner, &change.new_owner)?;
                Ok(Plan::ChangeOwner { slot, change })
            }
        }
    }

    /// Application phase; consumes the nonce before touching anything else
    pub(crate) fn commit(&mut self, prepared: PreparedExecution) -> ExecutionReceipt {
        let PreparedExecution {
            selector,
            nonce,
            signers,
            plan,
        } = prepared;

        let used = self.nonces.advance(selector);
        debug_assert_eq!(used, nonce, "prepared execution is stale");

        let ctx = DispatchContext { _private: () };
        let events = match plan {
            Plan::CreateClaimData(claim) => vec![self.create_claim_data(&ctx, claim)],
            Plan::CreateClaimDataMultiple(claims) => self.create_claim_data_multiple(&ctx, claims),
            Plan::ChangeOwner { slot, change } => vec![self.change_owner(&ctx, slot, change)],
        };

        log::info!(
            "Executed {} (nonce {}): {} event(s)",
            OperationKind::from_selector(&selector).map_or("unknown", |k| k.name()),
            nonce,
            events.len()
        );

        ExecutionReceipt {
            selector,
            nonce,
            signers,
            events,
            executed_at: Utc::now(),
        }
    }

    // =========================================================================
    // Whitelisted operations (dispatcher only)
    // =========================================================================

    fn create_claim_data(&mut self, _ctx: &DispatchContext, claim: ClaimInput) -> Event {
        self.claims
            .insert_vacant(claim.claimant, claim.access_key, claim.amount);

        log::info!(
            "Claim created for {}: {} units claimable at {} (key {})",
            claim.claimant,
            claim.amount,
            claim.claimable_timestamp,
            claim.access_key
        );

        Event::ClaimDataCreated {
            claimant: claim.claimant,
            claimable_timestamp: claim.claimable_timestamp,
            amount: claim.amount,
            access_key: claim.access_key,
        }
    }

    fn create_claim_data_multiple(
        &mut self,
        ctx: &DispatchContext,
        claims: Vec<ClaimInput>,
    ) -> Vec<Event> {
        claims
            .into_iter()
            .map(|claim| self.create_claim_data(ctx, claim))
            .collect()
    }

    fn change_owner(&mut self, _ctx: &DispatchContext, slot: usize, change: OwnerChange) -> Event {
        let applied = self.owners.swap_slot(slot, change.new_owner);
        debug_assert_eq!(applied, change);

        Event::OwnerChanged {
            old_owner: applied.old_owner,
            new_owner: applied.new_owner,
        }
    }

    /// Direct invocation of a whitelisted operation from outside the dispatcher
    ///
    /// Always fails: the operations are reachable only through `execute`.
    pub fn call(
        &self,
        caller: Address,
        selector: Selector,
        _input_data: &[u8],
    ) -> Result<Vec<Event>, EngineError> {
        match OperationKind::from_selector(&selector) {
            Some(kind) => {
                log::warn!("Direct call to {} by {} forbidden", kind, caller);
                Err(EngineError::ExecutionForbidden)
            }
            None => Err(EngineError::UnknownSelector(selector)),
        }
    }

    // =========================================================================
    // Read-only views
    // =========================================================================

    pub fn get_nonce(&self, selector: &Selector) -> u64 {
        self.nonces.current(selector)
    }

    pub fn get_owners(&self) -> [Address; OWNER_COUNT] {
        self.owners.owners()
    }

    pub fn is_owner(&self, account: &Address) -> bool {
        self.owners.is_owner(account)
    }

    pub fn get_base_token(&self) -> Address {
        self.base_token
    }

    pub fn get_admin(&self) -> Address {
        self.admin
    }

    pub fn is_admin(&self, account: &Address) -> bool {
        self.admin == *account
    }

    /// Claim record, or the zero sentinel for unknown keys
    pub fn get_claim_data(&self, claimant: &Address, access_key: &B256) -> ClaimData {
        self.claims.get(claimant, access_key)
    }

    pub fn claims(&self) -> &ClaimRegistry {
        &self.claims
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn domain_separator(&self) -> B256 {
        self.domain.separator()
    }

    /// Digest owners must sign for `selector` and `input_data` at the current nonce
    pub fn hash_typed_call(&self, selector: Selector, input_data: &[u8]) -> B256 {
        self.domain
            .hash_typed_call(self.get_nonce(&selector), selector, input_data)
    }

    /// Recover every signer in a combined blob
    pub fn recover_signer(&self, digest: &B256, signatures: &[u8]) -> Result<Vec<Address>, EngineError> {
        Ok(recover_signers(digest, signatures)?)
    }
}

fn check_config(admin: &Address, base_token: &Address, domain: &Domain) -> Result<(), EngineError> {
    if base_token.is_zero() || admin.is_zero() {
        return Err(EngineError::NoZeroAddress);
    }
    if domain.chain_id == 0 {
        return Err(EngineError::InvalidDomain("chain id must be non-zero".to_string()));
    }
    if domain.name.is_empty() || domain.version.is_empty() {
        return Err(EngineError::InvalidDomain(
            "name and version must be set".to_string(),
        ));
    }
    if domain.verifying_contract.is_zero() {
        return Err(EngineError::NoZeroAddress);
    }
    Ok(())
}
