//! Domain-separated typed-data digests
//!
//! Owners sign a [`FunctionCall`] message under an
//! `EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)`
//! domain, so any wallet that implements `signTypedData` reproduces the
//! engine's digest.

use crate::core::interface::FunctionCall;
use alloy_primitives::{Address, Bytes, Selector, B256, U256};
use alloy_sol_types::{Eip712Domain, SolStruct};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Domain name the engine signs under
pub const DOMAIN_NAME: &str = "StakingClaim";

/// Domain version the engine signs under
pub const DOMAIN_VERSION: &str = "1";

/// Signing domain binding digests to one deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub version: String,
    /// Execution context identifier (chain id)
    pub chain_id: u64,
    /// Engine instance identifier
    pub verifying_contract: Address,
}

impl Domain {
    /// Domain with the engine's name and version
    pub fn new(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id,
            verifying_contract,
        }
    }

    pub fn to_eip712(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(Cow::Owned(self.name.clone())),
            Some(Cow::Owned(self.version.clone())),
            Some(U256::from(self.chain_id)),
            Some(self.verifying_contract),
            None,
        )
    }

    pub fn separator(&self) -> B256 {
        self.to_eip712().separator()
    }

    /// Digest owners sign to authorize `selector` with `input_data` at `nonce`
    pub fn hash_typed_call(&self, nonce: u64, selector: Selector, input_data: &[u8]) -> B256 {
        let message = FunctionCall {
            nonce: U256::from(nonce),
            selector,
            inputData: Bytes::copy_from_slice(input_data),
        };
        message.eip712_signing_hash(&self.to_eip712())
    }
}
