//! ECDSA key management for owners and signers
//!
//! Provides key pair generation, address derivation and recoverable signing
//! using the secp256k1 elliptic curve. Addresses follow the Ethereum rule:
//! the last 20 bytes of Keccak-256 over the uncompressed public key.

use rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::signature::SIGNATURE_LENGTH;
use alloy_primitives::{keccak256, Address, B256};

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key (`0x` prefix optional)
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let stripped = hex_key.strip_prefix("0x").unwrap_or(hex_key);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a hex string
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Get the public key as a hex string (uncompressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize_uncompressed())
    }

    /// Account address of this key
    pub fn address(&self) -> Address {
        public_key_to_address(&self.public_key)
    }

    /// Sign a 32-byte digest, producing an `r || s || v` record with `v` in {27, 28}
    pub fn sign_digest(&self, digest: &B256) -> [u8; SIGNATURE_LENGTH] {
        sign_digest(&self.secret_key, digest)
    }
}

/// Convert a public key to an account address
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    // Skip the 0x04 prefix
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

/// Sign a digest with a secret key
///
/// libsecp256k1 always produces low-`s` signatures, so the result is
/// accepted by the engine's malleability check.
pub fn sign_digest(secret_key: &SecretKey, digest: &B256) -> [u8; SIGNATURE_LENGTH] {
    let secp = Secp256k1::new();
    let message = Message::from_digest(digest.0);
    let (recovery_id, compact) = secp
        .sign_ecdsa_recoverable(&message, secret_key)
        .serialize_compact();

    let mut record = [0u8; SIGNATURE_LENGTH];
    record[..64].copy_from_slice(&compact);
    record[64] = 27 + recovery_id.to_i32() as u8;
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_pair_generation() {
        let kp = KeyPair::generate();
        assert_eq!(kp.private_key_hex().len(), 64);
        assert_eq!(kp.public_key_hex().len(), 130);
        assert!(!kp.address().is_zero());
    }

    #[test]
    fn test_known_address() {
        // keccak256("cow"), the signer used in the typed-data reference example
        let kp = KeyPair::from_private_key_hex(
            "c85ef7d79691fe79573b1a7064c19c1a9819ebdbd1faaab1a8ec92344438aaf4",
        )
        .unwrap();
        assert_eq!(
            kp.address().to_string(),
            "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"
        );
    }

    #[test]
    fn test_key_pair_from_hex() {
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::from_private_key_hex(&format!("0x{}", kp1.private_key_hex())).unwrap();
        assert_eq!(kp1.public_key_hex(), kp2.public_key_hex());
        assert_eq!(kp1.address(), kp2.address());
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(matches!(
            KeyPair::from_private_key_hex("not hex"),
            Err(KeyError::InvalidPrivateKey)
        ));
        assert!(matches!(
            KeyPair::from_private_key_hex(&"00".repeat(32)),
            Err(KeyError::InvalidPrivateKey)
        ));
    }

    #[test]
    fn test_address_from_public_key() {
        let kp = KeyPair::generate();
        let uncompressed = kp.public_key.serialize_uncompressed();
        let hash = keccak256(&uncompressed[1..]);
        assert_eq!(public_key_to_address(&kp.public_key).as_slice(), &hash[12..]);
    }

    #[test]
    fn test_sign_digest_v_range() {
        let kp = KeyPair::generate();
        let sig = kp.sign_digest(&keccak256(b"payload"));
        assert!(sig[64] == 27 || sig[64] == 28);
    }
}
