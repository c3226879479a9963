//! Signature engine: secp256k1 ECDSA over SHA-256 digests

use crate::error::ChainError;
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{
    constants::{COMPACT_SIGNATURE_SIZE, PUBLIC_KEY_SIZE, SECRET_KEY_SIZE},
    ecdsa::Signature,
    All, Message, PublicKey, Secp256k1, SecretKey,
};
use sha2::{Digest, Sha256};

/// Shared signing/verification context, built once per process.
static SECP256K1_CONTEXT: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Attempts at drawing a valid scalar before giving up on the RNG.
const MAX_KEYGEN_ATTEMPTS: usize = 16;

/// A signing key and its public counterpart.
///
/// Deliberately not `Clone`: the secret stays with whoever generated it.
#[derive(Debug)]
pub struct KeyPair {
    secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a new random KeyPair from the OS random number generator.
    ///
    /// Fails with [`ChainError::RandomnessUnavailable`] when the OS cannot supply
    /// secure randomness. Callers should treat that as fatal.
    pub fn generate() -> Result<Self, ChainError> {
        let mut seed = [0u8; SECRET_KEY_SIZE];
        for _ in 0..MAX_KEYGEN_ATTEMPTS {
            OsRng
                .try_fill_bytes(&mut seed)
                .map_err(|e| ChainError::RandomnessUnavailable(e.to_string()))?;
            // Zero or >= curve order are rejected; draw again.
            if let Ok(secret_key) = SecretKey::from_slice(&seed) {
                return Ok(Self::from_secret_key(secret_key));
            }
        }
        Err(ChainError::RandomnessUnavailable(format!(
            "no valid secret key after {} draws",
            MAX_KEYGEN_ATTEMPTS
        )))
    }

    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP256K1_CONTEXT, &secret_key);
        KeyPair {
            secret_key,
            public_key,
        }
    }

    /// Creates a KeyPair from raw secret key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, ChainError> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|e| {
            if bytes.len() != SECRET_KEY_SIZE {
                ChainError::Crypto(format!(
                    "Secret key must be {} bytes, got {}",
                    SECRET_KEY_SIZE,
                    bytes.len()
                ))
            } else {
                ChainError::Crypto(format!("Invalid secret key bytes: {}", e))
            }
        })?;

        Ok(Self::from_secret_key(secret_key))
    }

    /// Returns the public key as a compressed byte array.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.public_key.serialize()
    }

    /// Hashes `message` with SHA-256 and signs the digest, returning compact signature bytes.
    pub fn sign(&self, message: &[u8]) -> Result<[u8; COMPACT_SIGNATURE_SIZE], ChainError> {
        let message = digest_message(message).map_err(|e| ChainError::Signing(e.to_string()))?;
        let signature = SECP256K1_CONTEXT.sign_ecdsa(&message, &self.secret_key);
        Ok(signature.serialize_compact())
    }
}

fn digest_message(message: &[u8]) -> Result<Message, ChainError> {
    let digest = Sha256::digest(message);
    Message::from_digest_slice(&digest)
        .map_err(|e| ChainError::Crypto(format!("Failed to create message: {}", e)))
}

/// Verifies a compact ECDSA signature over `message` against a parsed public key.
pub fn verify_with_key(
    public_key: &PublicKey,
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<(), ChainError> {
    if signature_bytes.len() != COMPACT_SIGNATURE_SIZE {
        return Err(ChainError::Crypto(format!(
            "Signature must be exactly {} bytes (compact), got {}",
            COMPACT_SIGNATURE_SIZE,
            signature_bytes.len()
        )));
    }

    let message = digest_message(message)?;
    let signature = Signature::from_compact(signature_bytes)
        .map_err(|e| ChainError::Crypto(format!("Invalid signature: {}", e)))?;

    SECP256K1_CONTEXT
        .verify_ecdsa(&message, &signature, public_key)
        .map_err(|_| ChainError::Crypto("Signature verification failed".to_string()))
}

/// Verifies an ECDSA signature given the raw compressed public key bytes.
pub fn verify_signature(
    public_key_bytes: &[u8],
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<(), ChainError> {
    if public_key_bytes.len() != PUBLIC_KEY_SIZE {
        return Err(ChainError::Crypto(format!(
            "Public key must be exactly {} bytes (compressed), got {}",
            PUBLIC_KEY_SIZE,
            public_key_bytes.len()
        )));
    }

    let public_key = PublicKey::from_slice(public_key_bytes)
        .map_err(|e| ChainError::Crypto(format!("Invalid public key: {}", e)))?;

    verify_with_key(&public_key, message, signature_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        let keypair = KeyPair::generate().unwrap();
        assert_eq!(keypair.public_key_bytes().len(), PUBLIC_KEY_SIZE);

        let other = KeyPair::generate().unwrap();
        assert_ne!(keypair.public_key_bytes(), other.public_key_bytes());
    }

    #[test]
    fn test_signing_and_verification() {
        let keypair = KeyPair::generate().unwrap();
        let message = b"Alice pays Bob";

        let signature = keypair.sign(message).unwrap();
        assert_eq!(signature.len(), COMPACT_SIGNATURE_SIZE);

        let result = verify_signature(&keypair.public_key_bytes(), message, &signature);
        assert!(result.is_ok());
    }

    #[test]
    fn test_wrong_key_fails() {
        let keypair1 = KeyPair::generate().unwrap();
        let keypair2 = KeyPair::generate().unwrap();

        let message = b"Test message";
        let signature = keypair1.sign(message).unwrap();

        let result = verify_with_key(&keypair2.public_key, message, &signature);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Cryptographic error: Signature verification failed"
        );
    }

    #[test]
    fn test_tampered_message() {
        let keypair = KeyPair::generate().unwrap();
        let signature = keypair.sign(b"Original message").unwrap();

        let result = verify_with_key(&keypair.public_key, b"Tampered message", &signature);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_key_or_sig_length_check() {
        let keypair = KeyPair::generate().unwrap();
        let message = b"Test";
        let signature = keypair.sign(message).unwrap();
        let pubkey_bytes = keypair.public_key_bytes();

        let result = verify_signature(&pubkey_bytes[1..], message, &signature);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Public key must be exactly"));

        let result = verify_signature(&pubkey_bytes, message, &signature[1..]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Signature must be exactly"));
    }

    #[test]
    fn test_garbage_signature_is_rejected() {
        let keypair = KeyPair::generate().unwrap();
        let garbage = [0xFFu8; COMPACT_SIGNATURE_SIZE];
        assert!(verify_with_key(&keypair.public_key, b"msg", &garbage).is_err());
    }

    #[test]
    fn test_from_secret_bytes_is_deterministic() {
        let bytes = [7u8; SECRET_KEY_SIZE];
        let a = KeyPair::from_secret_bytes(&bytes).unwrap();
        let b = KeyPair::from_secret_bytes(&bytes).unwrap();
        assert_eq!(a.public_key_bytes(), b.public_key_bytes());
    }

    #[test]
    fn test_from_secret_bytes_invalid_length() {
        let short_bytes = [0u8; SECRET_KEY_SIZE - 1];
        let result = KeyPair::from_secret_bytes(&short_bytes);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Secret key must be"));
    }
}
