/// Transaction types for powledger
use crate::crypto::KeyPair;
use crate::error::ChainError;
use sha2::{Digest, Sha256};

/// Version tag prefixed to every signable message. Bump when the layout changes.
pub const SIGNING_ENCODING_VERSION: u8 = 1;

/// Decimal places used when rendering an amount for signing.
pub const AMOUNT_DECIMALS: usize = 6;

/// A signed transfer of `amount` from `sender` to `receiver`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: f64,
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

/// Renders an amount in the fixed six-decimal form used for signing.
///
/// `100.0` becomes `"100.000000"`. Values that differ only beyond the sixth
/// decimal share a rendering, and therefore a signature.
pub fn canonical_amount(amount: f64) -> String {
    format!("{:.*}", AMOUNT_DECIMALS, amount)
}

pub(crate) fn extend_len_prefixed(message: &mut Vec<u8>, bytes: &[u8]) {
    message.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    message.extend_from_slice(bytes);
}

impl Transaction {
    /// Builds the transfer and signs it with `keypair`.
    ///
    /// Nothing is returned unless the signature was produced.
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: f64,
        keypair: &KeyPair,
    ) -> Result<Self, ChainError> {
        let mut tx = Transaction {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            signature: Vec::new(),
        };
        let signature = keypair.sign(&tx.signable_message())?;
        tx.signature = signature.to_vec();
        Ok(tx)
    }

    /// Canonical bytes covered by the signature: sender, receiver and amount only.
    pub fn signable_message(&self) -> Vec<u8> {
        let mut message = vec![SIGNING_ENCODING_VERSION];
        extend_len_prefixed(&mut message, self.sender.as_bytes());
        extend_len_prefixed(&mut message, self.receiver.as_bytes());
        extend_len_prefixed(&mut message, canonical_amount(self.amount).as_bytes());
        message
    }

    /// Identifier of the signed transaction, signature included.
    pub fn hash(&self) -> [u8; 32] {
        let mut message = self.signable_message();
        extend_len_prefixed(&mut message, &self.signature);
        Sha256::digest(&message).into()
    }

    pub fn hash_str(&self) -> String {
        hex::encode(self.hash())
    }
}
