//! Claim entitlement registry
//!
//! Records are keyed by claimant and access key, where the access key is the
//! packed hash of (claimant, claimable timestamp, amount). Records are created
//! once and never overwritten by the engine.

use alloy_primitives::aliases::U48;
use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::{sol_data, SolType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Largest claimable timestamp (uint48)
pub const MAX_CLAIMABLE_TIMESTAMP: u64 = (1 << 48) - 1;

/// Packed preimage of an access key
type AccessKeyPreimage = (sol_data::Address, sol_data::Uint<48>, sol_data::Uint<256>);

/// Claim-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Overwriting claim for {claimant} at {access_key}")]
    OverwritingClaim { claimant: Address, access_key: B256 },
    #[error("Claimable timestamp {0} exceeds 48 bits")]
    TimestampOutOfRange(u64),
}

/// Redemption state of a claim
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimStatus {
    #[default]
    Unclaimed,
    Claimed,
}

/// Stored claim entitlement
///
/// The default value doubles as the "unknown key" sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimData {
    /// Amount in base-token units
    pub amount: U256,
    pub status: ClaimStatus,
}

/// Compute the access key for a claim
///
/// Tight packing: address (20 bytes) || uint48 timestamp (6 bytes) || uint256 amount (32 bytes).
pub fn access_key(
    claimant: &Address,
    claimable_timestamp: u64,
    amount: U256,
) -> Result<B256, ClaimError> {
    let timestamp = U48::try_from(claimable_timestamp)
        .map_err(|_| ClaimError::TimestampOutOfRange(claimable_timestamp))?;
    let packed = AccessKeyPreimage::abi_encode_packed(&(*claimant, timestamp, amount));
    Ok(keccak256(packed))
}

/// Registry of claim records, claimant -> access key -> record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRegistry {
    claims: HashMap<Address, HashMap<B256, ClaimData>>,
}

impl ClaimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for (claimant, access key), or the zero sentinel
    pub fn get(&self, claimant: &Address, access_key: &B256) -> ClaimData {
        self.claims
            .get(claimant)
            .and_then(|by_key| by_key.get(access_key))
            .copied()
            .unwrap_or_default()
    }

    pub fn contains(&self, claimant: &Address, access_key: &B256) -> bool {
        self.claims
            .get(claimant)
            .is_some_and(|by_key| by_key.contains_key(access_key))
    }

    /// Fail if a record already exists at (claimant, access key)
    pub fn ensure_vacant(&self, claimant: &Address, access_key: &B256) -> Result<(), ClaimError> {
        if self.contains(claimant, access_key) {
            return Err(ClaimError::OverwritingClaim {
                claimant: *claimant,
                access_key: *access_key,
            });
        }
        Ok(())
    }

    /// Insert at a key already checked with [`ensure_vacant`](Self::ensure_vacant)
    pub(crate) fn insert_vacant(&mut self, claimant: Address, access_key: B256, amount: U256) {
        self.claims.entry(claimant).or_default().insert(
            access_key,
            ClaimData {
                amount,
                status: ClaimStatus::Unclaimed,
            },
        );
    }

    /// All records held by one claimant, ordered by access key
    pub fn claims_for(&self, claimant: &Address) -> Vec<(B256, ClaimData)> {
        let mut records: Vec<_> = self
            .claims
            .get(claimant)
            .map(|by_key| by_key.iter().map(|(k, v)| (*k, *v)).collect())
            .unwrap_or_default();
        records.sort_by_key(|(key, _)| *key);
        records
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.claims.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Address {
        Address::repeat_byte(0x0a)
    }

    #[test]
    fn test_access_key_packing() {
        let amount = U256::from(1_000_000_000u64);
        let key = access_key(&user(), 1_725_148_800, amount).unwrap();

        let mut packed = Vec::new();
        packed.extend_from_slice(&[0x0a; 20]);
        packed.extend_from_slice(&1_725_148_800u64.to_be_bytes()[2..]);
        packed.extend_from_slice(&amount.to_be_bytes::<32>());
        assert_eq!(packed.len(), 58);
        assert_eq!(key, keccak256(&packed));
    }

    #[test]
    fn test_access_key_full_width_amount() {
        let amount = U256::MAX;
        let key = access_key(&user(), 1, amount).unwrap();

        let mut packed = Vec::new();
        packed.extend_from_slice(user().as_slice());
        packed.extend_from_slice(&[0, 0, 0, 0, 0, 1]);
        packed.extend_from_slice(&[0xff; 32]);
        assert_eq!(key, keccak256(&packed));
    }

    #[test]
    fn test_access_key_binds_all_fields() {
        let five = U256::from(5);
        let key = access_key(&user(), 100, five).unwrap();
        assert_ne!(key, access_key(&Address::repeat_byte(0x0b), 100, five).unwrap());
        assert_ne!(key, access_key(&user(), 101, five).unwrap());
        assert_ne!(key, access_key(&user(), 100, U256::from(6)).unwrap());
    }

    #[test]
    fn test_access_key_timestamp_range() {
        assert!(access_key(&user(), MAX_CLAIMABLE_TIMESTAMP, U256::from(1)).is_ok());
        assert_eq!(
            access_key(&user(), MAX_CLAIMABLE_TIMESTAMP + 1, U256::from(1)),
            Err(ClaimError::TimestampOutOfRange(MAX_CLAIMABLE_TIMESTAMP + 1))
        );
    }

    #[test]
    fn test_unknown_key_returns_sentinel() {
        let registry = ClaimRegistry::new();
        let data = registry.get(&user(), &B256::repeat_byte(1));
        assert_eq!(data, ClaimData::default());
        assert_eq!(data.amount, U256::ZERO);
        assert_eq!(data.status, ClaimStatus::Unclaimed);
    }

    #[test]
    fn test_insert_and_get() {
        let mut registry = ClaimRegistry::new();
        let key = access_key(&user(), 100, U256::from(5)).unwrap();

        registry.ensure_vacant(&user(), &key).unwrap();
        registry.insert_vacant(user(), key, U256::from(5));
        assert_eq!(
            registry.get(&user(), &key),
            ClaimData {
                amount: U256::from(5),
                status: ClaimStatus::Unclaimed
            }
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.claims_for(&user()).len(), 1);
        assert!(registry.claims_for(&Address::repeat_byte(0x0b)).is_empty());
    }

    #[test]
    fn test_occupied_key_is_reported() {
        let mut registry = ClaimRegistry::new();
        let key = access_key(&user(), 100, U256::from(5)).unwrap();
        registry.insert_vacant(user(), key, U256::from(5));

        assert_eq!(
            registry.ensure_vacant(&user(), &key),
            Err(ClaimError::OverwritingClaim {
                claimant: user(),
                access_key: key
            })
        );
        assert!(registry
            .ensure_vacant(&Address::repeat_byte(0x0b), &key)
            .is_ok());
    }

    #[test]
    fn test_claims_for_is_sorted() {
        let mut registry = ClaimRegistry::new();
        for byte in [9u8, 3, 6] {
            registry.insert_vacant(user(), B256::repeat_byte(byte), U256::from(byte));
        }

        let keys: Vec<B256> = registry.claims_for(&user()).into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                B256::repeat_byte(3),
                B256::repeat_byte(6),
                B256::repeat_byte(9)
            ]
        );
    }
}
