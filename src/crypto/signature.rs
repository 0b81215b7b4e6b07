//! Signature splitting and signer recovery
//!
//! A combined signature blob is a plain concatenation of 65-byte
//! `r || s || v` records. Splitting checks the length only; recovery parses
//! one record and returns whichever address the curve math produces. A
//! wrong-but-well-formed signature therefore yields some unrelated address,
//! which the caller's authorization check rejects.

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};
use thiserror::Error;

use super::keys::public_key_to_address;
use alloy_primitives::{Address, B256};

/// Size of one `r || s || v` signature record
pub const SIGNATURE_LENGTH: usize = 65;

/// secp256k1 curve order divided by two; `s` values above this are rejected
const HALF_CURVE_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// Errors raised while splitting or recovering signatures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Invalid signature length: {0}")]
    InvalidSignatureLength(usize),
    #[error("Invalid signature")]
    InvalidSignature,
}

/// One fixed-size signature record
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SignatureRecord([u8; SIGNATURE_LENGTH]);

impl SignatureRecord {
    /// Parse a single record, rejecting any length other than 65
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        let record: [u8; SIGNATURE_LENGTH] = bytes
            .try_into()
            .map_err(|_| SignatureError::InvalidSignatureLength(bytes.len()))?;
        Ok(Self(record))
    }

    pub fn s(&self) -> &[u8] {
        &self.0[32..64]
    }

    pub fn v(&self) -> u8 {
        self.0[64]
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Recover the signer of `digest`
    pub fn recover(&self, digest: &B256) -> Result<Address, SignatureError> {
        if self.s() > &HALF_CURVE_ORDER[..] {
            return Err(SignatureError::InvalidSignature);
        }

        let recovery_byte = match self.v() {
            27 | 28 => self.v() - 27,
            0 | 1 => self.v(),
            _ => return Err(SignatureError::InvalidSignature),
        };

        let recovery_id = RecoveryId::from_i32(i32::from(recovery_byte))
            .map_err(|_| SignatureError::InvalidSignature)?;
        let signature = RecoverableSignature::from_compact(&self.0[..64], recovery_id)
            .map_err(|_| SignatureError::InvalidSignature)?;

        let secp = Secp256k1::verification_only();
        let message = Message::from_digest(digest.0);
        let public_key = secp
            .recover_ecdsa(&message, &signature)
            .map_err(|_| SignatureError::InvalidSignature)?;

        Ok(public_key_to_address(&public_key))
    }
}

impl std::fmt::Debug for SignatureRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SignatureRecord(0x{})", hex::encode(self.0))
    }
}

/// Split a concatenated blob into individual records
///
/// Fails unless the blob is a non-empty exact multiple of [`SIGNATURE_LENGTH`].
pub fn split_signatures(blob: &[u8]) -> Result<Vec<SignatureRecord>, SignatureError> {
    if blob.is_empty() || blob.len() % SIGNATURE_LENGTH != 0 {
        return Err(SignatureError::InvalidSignatureLength(blob.len()));
    }

    blob.chunks_exact(SIGNATURE_LENGTH)
        .map(SignatureRecord::from_slice)
        .collect()
}

/// Recover every signer in a combined blob, in submission order
pub fn recover_signers(digest: &B256, blob: &[u8]) -> Result<Vec<Address>, SignatureError> {
    split_signatures(blob)?
        .iter()
        .map(|record| record.recover(digest))
        .collect()
}

/// Concatenate individual records into the blob accepted by `execute`
pub fn combine_signatures<S: AsRef<[u8]>>(signatures: &[S]) -> Vec<u8> {
    signatures
        .iter()
        .flat_map(|s| s.as_ref().iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use alloy_primitives::keccak256;

    fn recover_signer(digest: &B256, signature: &[u8]) -> Result<Address, SignatureError> {
        SignatureRecord::from_slice(signature)?.recover(digest)
    }

    // Three records taken from a real combined blob
    const COMBINED: &str = "548326630524311d1cf3c618f20b25d3a2b6d9d5b59d00f4f70741d5de8e2ef9034e6dadc82a357038bebee3afab9ed0d0f0c08248f48b33a17393566f7328af1bb9bcea58c04133ce374d5f196b4a4ea2b66cee875dcfac26668ecd61cb30474b2f1ea76bdb99be709c8f0130bfeacf695284d15eb2da61d6a71e8b165ad839aa1b89aee965f02a241dbae9c5f3368c51bb9923908417b5e67311c0d3602f99d90e47bb3e1e63c87d914497843813760edd0339f1d0756b360c3e8eede1a985a4821b";

    #[test]
    fn test_split_combined_blob() {
        let blob = hex::decode(COMBINED).unwrap();
        let records = split_signatures(&blob).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            hex::encode(records[0].as_bytes()),
            "548326630524311d1cf3c618f20b25d3a2b6d9d5b59d00f4f70741d5de8e2ef9034e6dadc82a357038bebee3afab9ed0d0f0c08248f48b33a17393566f7328af1b"
        );
        assert_eq!(
            hex::encode(records[1].as_bytes()),
            "b9bcea58c04133ce374d5f196b4a4ea2b66cee875dcfac26668ecd61cb30474b2f1ea76bdb99be709c8f0130bfeacf695284d15eb2da61d6a71e8b165ad839aa1b"
        );
        assert_eq!(
            hex::encode(records[2].as_bytes()),
            "89aee965f02a241dbae9c5f3368c51bb9923908417b5e67311c0d3602f99d90e47bb3e1e63c87d914497843813760edd0339f1d0756b360c3e8eede1a985a4821b"
        );
        assert_eq!(records[2].v(), 0x1b);
    }

    #[test]
    fn test_split_rejects_bad_lengths() {
        for len in [0usize, 1, 64, 66, 130 - 1, 131, 196] {
            let blob = vec![0u8; len];
            assert_eq!(
                split_signatures(&blob),
                Err(SignatureError::InvalidSignatureLength(len)),
                "length {} should be rejected",
                len
            );
        }
        for count in 1..=4 {
            assert!(split_signatures(&vec![0u8; count * SIGNATURE_LENGTH]).is_ok());
        }
    }

    #[test]
    fn test_recover_signer() {
        let kp = KeyPair::generate();
        let digest = keccak256(b"typed message");
        let sig = kp.sign_digest(&digest);

        assert_eq!(recover_signer(&digest, &sig).unwrap(), kp.address());
    }

    #[test]
    fn test_recover_signer_wrong_digest() {
        let kp = KeyPair::generate();
        let sig = kp.sign_digest(&keccak256(b"one"));

        let recovered = recover_signer(&keccak256(b"two"), &sig).unwrap();
        assert_ne!(recovered, kp.address());
    }

    #[test]
    fn test_recover_accepts_raw_recovery_id() {
        let kp = KeyPair::generate();
        let digest = keccak256(b"raw v");
        let mut sig = kp.sign_digest(&digest);
        sig[64] -= 27;

        assert_eq!(recover_signer(&digest, &sig).unwrap(), kp.address());
    }

    #[test]
    fn test_recover_rejects_bad_v() {
        let kp = KeyPair::generate();
        let digest = keccak256(b"bad v");
        let mut sig = kp.sign_digest(&digest);
        sig[64] = 29;

        assert_eq!(
            recover_signer(&digest, &sig),
            Err(SignatureError::InvalidSignature)
        );
    }

    #[test]
    fn test_recover_rejects_high_s() {
        let kp = KeyPair::generate();
        let digest = keccak256(b"high s");
        let mut sig = kp.sign_digest(&digest);
        sig[32..64].copy_from_slice(&[0xff; 32]);

        assert_eq!(
            recover_signer(&digest, &sig),
            Err(SignatureError::InvalidSignature)
        );
    }

    #[test]
    fn test_recover_single_rejects_wrong_length() {
        let digest = keccak256(b"x");
        assert_eq!(
            recover_signer(&digest, &[0u8; 66]),
            Err(SignatureError::InvalidSignatureLength(66))
        );
    }

    #[test]
    fn test_recover_signers_in_order() {
        let keys: Vec<KeyPair> = (0..3).map(|_| KeyPair::generate()).collect();
        let digest = keccak256(b"ordered");
        let sigs: Vec<_> = keys.iter().map(|k| k.sign_digest(&digest)).collect();
        let blob = combine_signatures(&sigs);

        let signers = recover_signers(&digest, &blob).unwrap();
        let expected: Vec<Address> = keys.iter().map(|k| k.address()).collect();
        assert_eq!(signers, expected);
    }
}
