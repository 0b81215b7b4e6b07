//! Claim data registry
//!
//! Holds the claim entitlements the multisig authorizes. Redemption against
//! the base token happens elsewhere; this registry only records who may
//! claim how much, and from when.
//!
//! # Example
//!
//! ```ignore
//! use staking_claim::claim::{access_key, ClaimRegistry};
//!
//! let amount = U256::from(1_000_000_000u64);
//! let key = access_key(&claimant, 1_725_148_800, amount)?;
//! registry.ensure_vacant(&claimant, &key)?;
//!
//! let data = registry.get(&claimant, &key);
//! assert_eq!(data.amount, U256::ZERO);
//! ```

pub mod registry;

pub use registry::{
    access_key, ClaimData, ClaimError, ClaimRegistry, ClaimStatus, MAX_CLAIMABLE_TIMESTAMP,
};
