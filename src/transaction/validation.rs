/// Signature checks for transactions, kept apart from the type definitions
use crate::crypto::{verify_signature, verify_with_key};
use crate::error::ChainError;
use crate::transaction::types::Transaction;
use secp256k1::PublicKey;

impl Transaction {
    /// Checks the signature against `public_key`, reporting why it failed.
    pub fn validate_signature(&self, public_key: &PublicKey) -> Result<(), ChainError> {
        if self.signature.is_empty() {
            return Err(ChainError::Crypto("Transaction not signed".to_string()));
        }
        verify_with_key(public_key, &self.signable_message(), &self.signature)
    }

    /// True iff the signature matches this exact (sender, receiver, amount) under `public_key`.
    ///
    /// Never panics: malformed signatures, wrong keys and tampered fields are all `false`.
    pub fn verify(&self, public_key: &PublicKey) -> bool {
        self.validate_signature(public_key).is_ok()
    }

    /// Same as [`Transaction::verify`] but takes compressed public key bytes.
    pub fn verify_with_bytes(&self, public_key_bytes: &[u8]) -> bool {
        verify_signature(public_key_bytes, &self.signable_message(), &self.signature).is_ok()
    }
}
