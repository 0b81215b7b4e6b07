//! Owner set and replay protection
//!
//! The engine is a 3-of-3 multisig: every execution needs signatures from
//! all three current owners over a digest that embeds the per-selector nonce.
//!
//! # Example
//!
//! ```ignore
//! use staking_claim::multisig::{OwnerRegistry, NonceStore};
//!
//! let mut owners = OwnerRegistry::new([alice, bob, carol])?;
//! assert!(owners.is_owner(&bob));
//!
//! // Bob's slot is the one dave would take over
//! assert_eq!(owners.check_replace(&bob, &dave)?, 1);
//! ```

pub mod nonce;
pub mod owners;

pub use nonce::NonceStore;
pub use owners::{OwnerChange, OwnerError, OwnerRegistry, OWNER_COUNT};
