//! Cryptographic utilities for the engine
//!
//! This module provides:
//! - ECDSA key management (secp256k1) with Ethereum-style addresses
//! - Signature splitting and signer recovery
//!
//! Hashing is Keccak-256 throughout, via `alloy_primitives::keccak256`.

pub mod keys;
pub mod signature;

pub use keys::{public_key_to_address, sign_digest, KeyError, KeyPair};
pub use signature::{
    combine_signatures, recover_signers, split_signatures, SignatureError, SignatureRecord,
    SIGNATURE_LENGTH,
};
