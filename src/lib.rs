//! StakingClaim: a threshold multisig execution engine in Rust
//!
//! This crate provides a 3-of-3 multisig command engine guarding a registry
//! of staking claim records, featuring:
//! - Domain-separated typed-data digests (EIP-712 compatible)
//! - ECDSA signer recovery (secp256k1) with Ethereum-style addresses
//! - Per-operation replay nonces
//! - A closed whitelist of operations reachable only through the dispatcher
//! - All-or-nothing batch claim creation
//! - Validated JSON snapshots with rotating backups
//!
//! # Example
//!
//! ```rust
//! use staking_claim::core::{Address, Domain, U256};
//! use staking_claim::crypto::{combine_signatures, KeyPair};
//! use staking_claim::engine::{ClaimInput, InitParams, Operation, StakingClaim};
//!
//! let owners: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
//! let mut engine = StakingClaim::initialize(InitParams {
//!     admin: Address::repeat_byte(0xad),
//!     owners: [owners[0].address(), owners[1].address(), owners[2].address()],
//!     base_token: Address::repeat_byte(0xb0),
//!     domain: Domain::new(1, Address::repeat_byte(0xc0)),
//! })
//! .unwrap();
//!
//! // Every owner signs the digest for the current nonce
//! let amount = U256::from(1_000_000_000u64);
//! let claim = ClaimInput::new(Address::repeat_byte(1), 1_725_148_800, amount).unwrap();
//! let op = Operation::CreateClaimData(claim);
//! let digest = engine.hash_typed_call(op.selector(), &op.encode_input());
//! let signatures: Vec<_> = owners.iter().map(|k| k.sign_digest(&digest)).collect();
//!
//! // Any owner relays
//! let receipt = engine
//!     .execute(
//!         owners[0].address(),
//!         op.selector(),
//!         &op.encode_input(),
//!         &combine_signatures(&signatures),
//!     )
//!     .unwrap();
//! assert_eq!(receipt.events.len(), 1);
//! assert_eq!(engine.get_claim_data(&claim.claimant, &claim.access_key).amount, amount);
//! ```

pub mod claim;
pub mod cli;
pub mod core;
pub mod crypto;
pub mod engine;
pub mod multisig;
pub mod storage;

// Re-export commonly used types
pub use claim::{access_key, ClaimData, ClaimRegistry, ClaimStatus};
pub use core::{Address, Domain, Selector, B256, U256};
pub use crypto::KeyPair;
pub use engine::{
    EngineError, Event, ExecutionReceipt, InitParams, Operation, OperationKind,
    SharedStakingClaim, StakingClaim,
};
pub use multisig::{NonceStore, OwnerRegistry};
pub use storage::{Storage, StorageConfig};
