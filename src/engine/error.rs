//! Engine error taxonomy
//!
//! Every failure is reported before any state changes and carries the
//! offending identity or key so a relayer can react (typically by re-reading
//! the nonce and collecting fresh signatures).

use crate::claim::ClaimError;
use crate::crypto::SignatureError;
use crate::multisig::OwnerError;
use alloy_primitives::{Address, Selector, B256};
use thiserror::Error;

/// Errors returned by the execution engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // Input malformation
    #[error("Invalid signature length: {0}")]
    InvalidSignatureLength(usize),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Invalid input data: {0}")]
    InvalidInputData(String),
    #[error("Unknown selector: {0}")]
    UnknownSelector(Selector),

    // Authorization failure
    #[error("Caller is not an owner: {0}")]
    CallerIsNotOwner(Address),
    #[error("Unauthorized signer: {0}")]
    UnauthorizedSigner(Address),
    #[error("Duplicate signer")]
    DuplicateSigner,

    // State conflict
    #[error("Overwriting claim for {claimant} at {access_key}")]
    OverwritingClaim { claimant: Address, access_key: B256 },
    #[error("Not an owner: {0}")]
    NotAnOwner(Address),

    // Structural misuse
    #[error("Execution forbidden outside the multisig dispatcher")]
    ExecutionForbidden,

    // Construction-time validation
    #[error("Zero address not allowed")]
    NoZeroAddress,
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}

impl From<SignatureError> for EngineError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::InvalidSignatureLength(len) => Self::InvalidSignatureLength(len),
            SignatureError::InvalidSignature => Self::InvalidSignature,
        }
    }
}

impl From<OwnerError> for EngineError {
    fn from(err: OwnerError) -> Self {
        match err {
            OwnerError::DuplicateOwner(_) => Self::DuplicateSigner,
            OwnerError::NotAnOwner(account) => Self::NotAnOwner(account),
            OwnerError::ZeroAddress => Self::NoZeroAddress,
        }
    }
}

impl From<ClaimError> for EngineError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::OverwritingClaim {
                claimant,
                access_key,
            } => Self::OverwritingClaim {
                claimant,
                access_key,
            },
            ClaimError::TimestampOutOfRange(_) => Self::InvalidInputData(err.to_string()),
        }
    }
}

impl From<alloy_sol_types::Error> for EngineError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::InvalidInputData(err.to_string())
    }
}
