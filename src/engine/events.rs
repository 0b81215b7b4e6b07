//! Domain events and execution receipts

use alloy_primitives::{Address, Selector, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event emitted by a successful operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    ClaimDataCreated {
        claimant: Address,
        claimable_timestamp: u64,
        amount: U256,
        access_key: B256,
    },
    OwnerChanged {
        old_owner: Address,
        new_owner: Address,
    },
}

/// Outcome of one committed execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub selector: Selector,
    /// Nonce the signatures were made over
    pub nonce: u64,
    /// Recovered signers in submission order
    pub signers: Vec<Address>,
    /// Events in emission order
    pub events: Vec<Event>,
    pub executed_at: DateTime<Utc>,
}
