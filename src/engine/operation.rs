//! The closed set of operations the dispatcher can route to
//!
//! Each operation is one function of [`IStakingClaim`]; its selector and ABI
//! schema come from that declaration. Anything else is rejected with
//! `UnknownSelector`.

use crate::claim::{access_key, ClaimError};
use crate::core::interface::IStakingClaim::{
    changeOwnerCall, createClaimDataCall, createClaimDataMultipleCall,
};
use crate::engine::error::EngineError;
use crate::multisig::OwnerChange;
use alloy_primitives::aliases::U48;
use alloy_primitives::{Address, Selector, B256, U256};
use alloy_sol_types::SolCall;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whitelisted operation identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateClaimData,
    CreateClaimDataMultiple,
    ChangeOwner,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::CreateClaimData,
        OperationKind::CreateClaimDataMultiple,
        OperationKind::ChangeOwner,
    ];

    /// Canonical function signature the selector is derived from
    pub fn signature(&self) -> &'static str {
        match self {
            OperationKind::CreateClaimData => createClaimDataCall::SIGNATURE,
            OperationKind::CreateClaimDataMultiple => createClaimDataMultipleCall::SIGNATURE,
            OperationKind::ChangeOwner => changeOwnerCall::SIGNATURE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::CreateClaimData => "createClaimData",
            OperationKind::CreateClaimDataMultiple => "createClaimDataMultiple",
            OperationKind::ChangeOwner => "changeOwner",
        }
    }

    pub fn selector(&self) -> Selector {
        let selector = match self {
            OperationKind::CreateClaimData => createClaimDataCall::SELECTOR,
            OperationKind::CreateClaimDataMultiple => createClaimDataMultipleCall::SELECTOR,
            OperationKind::ChangeOwner => changeOwnerCall::SELECTOR,
        };
        Selector::from(selector)
    }

    pub fn from_selector(selector: &Selector) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.selector() == *selector)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload of one claim creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimInput {
    pub claimant: Address,
    pub claimable_timestamp: u64,
    pub amount: U256,
    pub access_key: B256,
}

impl ClaimInput {
    /// Build a claim with its access key derived from the other fields
    pub fn new(claimant: Address, claimable_timestamp: u64, amount: U256) -> Result<Self, ClaimError> {
        Ok(Self {
            claimant,
            claimable_timestamp,
            amount,
            access_key: access_key(&claimant, claimable_timestamp, amount)?,
        })
    }

    fn timestamp48(&self) -> U48 {
        U48::saturating_from(self.claimable_timestamp)
    }
}

impl From<createClaimDataCall> for ClaimInput {
    fn from(call: createClaimDataCall) -> Self {
        Self {
            claimant: call.claimant,
            claimable_timestamp: call.claimableTimestamp.to::<u64>(),
            amount: call.amount,
            access_key: call.accessKey,
        }
    }
}

/// A decoded, whitelisted operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateClaimData(ClaimInput),
    CreateClaimDataMultiple(Vec<ClaimInput>),
    ChangeOwner(OwnerChange),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::CreateClaimData(_) => OperationKind::CreateClaimData,
            Operation::CreateClaimDataMultiple(_) => OperationKind::CreateClaimDataMultiple,
            Operation::ChangeOwner(_) => OperationKind::ChangeOwner,
        }
    }

    pub fn selector(&self) -> Selector {
        self.kind().selector()
    }

    /// ABI-encoded input data for this operation, without the selector
    pub fn encode_input(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Operation::CreateClaimData(claim) => createClaimDataCall {
                claimant: claim.claimant,
                claimableTimestamp: claim.timestamp48(),
                amount: claim.amount,
                accessKey: claim.access_key,
            }
            .abi_encode_raw(&mut out),
            Operation::CreateClaimDataMultiple(claims) => createClaimDataMultipleCall {
                claimants: claims.iter().map(|c| c.claimant).collect(),
                claimableTimestamps: claims.iter().map(ClaimInput::timestamp48).collect(),
                amounts: claims.iter().map(|c| c.amount).collect(),
                accessKeys: claims.iter().map(|c| c.access_key).collect(),
            }
            .abi_encode_raw(&mut out),
            Operation::ChangeOwner(change) => changeOwnerCall {
                oldOwner: change.old_owner,
                newOwner: change.new_owner,
            }
            .abi_encode_raw(&mut out),
        }
        out
    }

    /// Decode `input_data` according to the schema bound to `selector`
    ///
    /// Words must be canonically padded: an address or uint48 with stray
    /// high bits is `InvalidInputData`, not silently truncated.
    pub fn decode(selector: Selector, input_data: &[u8]) -> Result<Self, EngineError> {
        let kind =
            OperationKind::from_selector(&selector).ok_or(EngineError::UnknownSelector(selector))?;

        let operation = match kind {
            OperationKind::CreateClaimData => Operation::CreateClaimData(
                createClaimDataCall::abi_decode_raw_validate(input_data)?.into(),
            ),
            OperationKind::CreateClaimDataMultiple => {
                let call = createClaimDataMultipleCall::abi_decode_raw_validate(input_data)?;
                let len = call.claimants.len();
                if call.claimableTimestamps.len() != len
                    || call.amounts.len() != len
                    || call.accessKeys.len() != len
                {
                    return Err(EngineError::InvalidInputData(format!(
                        "Array length mismatch: {} claimants, {} timestamps, {} amounts, {} access keys",
                        len,
                        call.claimableTimestamps.len(),
                        call.amounts.len(),
                        call.accessKeys.len()
                    )));
                }

                let claims = call
                    .claimants
                    .into_iter()
                    .zip(call.claimableTimestamps)
                    .zip(call.amounts)
                    .zip(call.accessKeys)
                    .map(|(((claimant, timestamp), amount), access_key)| ClaimInput {
                        claimant,
                        claimable_timestamp: timestamp.to::<u64>(),
                        amount,
                        access_key,
                    })
                    .collect();
                Operation::CreateClaimDataMultiple(claims)
            }
            OperationKind::ChangeOwner => {
                let call = changeOwnerCall::abi_decode_raw_validate(input_data)?;
                Operation::ChangeOwner(OwnerChange {
                    old_owner: call.oldOwner,
                    new_owner: call.newOwner,
                })
            }
        };

        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(byte: u8, ts: u64, amount: u64) -> ClaimInput {
        ClaimInput::new(Address::repeat_byte(byte), ts, U256::from(amount)).unwrap()
    }

    fn word(value: u64) -> [u8; 32] {
        U256::from(value).to_be_bytes::<32>()
    }

    #[test]
    fn test_selectors_are_distinct() {
        let selectors: Vec<Selector> = OperationKind::ALL.iter().map(|k| k.selector()).collect();
        assert_ne!(selectors[0], selectors[1]);
        assert_ne!(selectors[1], selectors[2]);
        assert_ne!(selectors[0], selectors[2]);
        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_selector(&kind.selector()), Some(kind));
            assert_eq!(OperationKind::from_name(kind.name()), Some(kind));
            assert!(kind.signature().starts_with(kind.name()));
        }
    }

    #[test]
    fn test_create_claim_layout() {
        let c = claim(0x11, 1_725_148_800, 1_000_000_000);
        let op = Operation::CreateClaimData(c);
        let input = op.encode_input();

        assert_eq!(input.len(), 4 * 32);
        assert_eq!(&input[12..32], &[0x11; 20]);
        assert_eq!(&input[32..64], &word(1_725_148_800));
        assert_eq!(&input[64..96], &word(1_000_000_000));
        assert_eq!(&input[96..128], c.access_key.as_slice());
        assert_eq!(Operation::decode(op.selector(), &input).unwrap(), op);
    }

    #[test]
    fn test_amount_above_128_bits() {
        let c = ClaimInput::new(Address::repeat_byte(1), 10, U256::MAX).unwrap();
        let op = Operation::CreateClaimData(c);
        let input = op.encode_input();

        assert_eq!(&input[64..96], &[0xff; 32]);
        assert_eq!(Operation::decode(op.selector(), &input).unwrap(), op);
    }

    #[test]
    fn test_batch_decodes_in_order() {
        let claims = vec![claim(1, 10, 100), claim(2, 20, 200), claim(3, 30, 300)];
        let op = Operation::CreateClaimDataMultiple(claims.clone());
        let decoded = Operation::decode(op.selector(), &op.encode_input()).unwrap();

        match decoded {
            Operation::CreateClaimDataMultiple(got) => assert_eq!(got, claims),
            other => panic!("unexpected operation {:?}", other),
        }
    }

    #[test]
    fn test_empty_batch() {
        let op = Operation::CreateClaimDataMultiple(vec![]);
        let decoded = Operation::decode(op.selector(), &op.encode_input()).unwrap();
        assert_eq!(decoded, op);
    }

    #[test]
    fn test_batch_length_mismatch() {
        let call = createClaimDataMultipleCall {
            claimants: vec![Address::repeat_byte(1)],
            claimableTimestamps: vec![U48::from_limbs([1])],
            amounts: vec![U256::from(1), U256::from(2)],
            accessKeys: vec![B256::ZERO],
        };
        let mut input = Vec::new();
        call.abi_encode_raw(&mut input);

        assert!(matches!(
            Operation::decode(OperationKind::CreateClaimDataMultiple.selector(), &input),
            Err(EngineError::InvalidInputData(_))
        ));
    }

    #[test]
    fn test_unknown_selector() {
        let selector = Selector::from([0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(
            Operation::decode(selector, &[]),
            Err(EngineError::UnknownSelector(selector))
        );
    }

    #[test]
    fn test_truncated_input() {
        let selector = OperationKind::CreateClaimData.selector();
        assert!(matches!(
            Operation::decode(selector, &[0u8; 64]),
            Err(EngineError::InvalidInputData(_))
        ));
    }

    #[test]
    fn test_dirty_padding_rejected() {
        let selector = OperationKind::CreateClaimData.selector();
        let mut input = Operation::CreateClaimData(claim(1, 10, 1)).encode_input();

        // Timestamp word with bit 48 set
        let mut wide = input.clone();
        wide[32..64].copy_from_slice(&word(1 << 48));
        assert!(matches!(
            Operation::decode(selector, &wide),
            Err(EngineError::InvalidInputData(_))
        ));

        // Address word with a non-zero high byte
        input[0] = 1;
        assert!(matches!(
            Operation::decode(selector, &input),
            Err(EngineError::InvalidInputData(_))
        ));
    }

    #[test]
    fn test_change_owner_layout() {
        let op = Operation::ChangeOwner(OwnerChange {
            old_owner: Address::repeat_byte(1),
            new_owner: Address::repeat_byte(2),
        });
        let input = op.encode_input();
        assert_eq!(input.len(), 64);
        assert_eq!(Operation::decode(op.selector(), &input).unwrap(), op);
    }
}
