//! Multisig execution engine
//!
//! Ties the owner set, nonces and claim registry together behind a single
//! dispatcher. Owners sign a domain-separated digest of
//! `(nonce, selector, input data)` off-engine; any owner relays the call
//! with all three signatures and the engine routes it to the operation.
//!
//! # Example
//!
//! ```ignore
//! use staking_claim::engine::{InitParams, Operation, StakingClaim};
//! use staking_claim::crypto::combine_signatures;
//!
//! let mut engine = StakingClaim::initialize(params)?;
//!
//! let op = Operation::CreateClaimData(claim);
//! let digest = engine.hash_typed_call(op.selector(), &op.encode_input());
//! let blob = combine_signatures(&[
//!     alice.sign_digest(&digest),
//!     bob.sign_digest(&digest),
//!     carol.sign_digest(&digest),
//! ]);
//!
//! let receipt = engine.execute(alice.address(), op.selector(), &op.encode_input(), &blob)?;
//! ```

pub mod error;
pub mod events;
pub mod operation;
pub mod shared;
pub mod staking_claim;

pub use error::EngineError;
pub use events::{Event, ExecutionReceipt};
pub use operation::{ClaimInput, Operation, OperationKind};
pub use shared::SharedStakingClaim;
pub use staking_claim::{InitParams, StakingClaim, REQUIRED_SIGNATURES};
