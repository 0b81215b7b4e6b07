//! Core engine building blocks
//!
//! This module contains the encoding primitives everything else shares:
//! - Fixed-width Ethereum types (addresses, selectors, hashes, amounts)
//! - Solidity declarations of the whitelisted calls
//! - Domain-separated typed-data digests

pub mod interface;
pub mod typed_data;

pub use alloy_primitives::{Address, Selector, B256, U256};
pub use interface::{FunctionCall, IStakingClaim};
pub use typed_data::{Domain, DOMAIN_NAME, DOMAIN_VERSION};
