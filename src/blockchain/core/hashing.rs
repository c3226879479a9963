use super::chain::Block;
use sha2::{Digest, Sha256};

/// Version tag mixed into every block digest. Bump when the layout changes.
pub const BLOCK_ENCODING_VERSION: u8 = 1;

fn update_len_prefixed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// SHA-256 of the block's canonical encoding, hex-encoded in lower case.
///
/// Layout: version, index (u64 LE), timestamp, transaction count (u64 LE),
/// then per transaction sender, receiver, amount bits (u64 LE) and raw
/// signature, then previous hash and nonce (u64 LE). Strings and byte
/// sequences are length-prefixed with a u64 LE. The stored `hash` field is
/// not part of the input.
pub fn calculate_hash(block: &Block) -> String {
    let mut hasher = Sha256::new();
    hasher.update([BLOCK_ENCODING_VERSION]);
    hasher.update(block.index.to_le_bytes());
    update_len_prefixed(&mut hasher, block.timestamp.as_bytes());
    hasher.update((block.transactions.len() as u64).to_le_bytes());
    for tx in &block.transactions {
        update_len_prefixed(&mut hasher, tx.sender.as_bytes());
        update_len_prefixed(&mut hasher, tx.receiver.as_bytes());
        hasher.update(tx.amount.to_bits().to_le_bytes());
        update_len_prefixed(&mut hasher, &tx.signature);
    }
    update_len_prefixed(&mut hasher, block.previous_hash.as_bytes());
    hasher.update(block.nonce.to_le_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    fn sample_block() -> Block {
        Block {
            index: 3,
            timestamp: "2024-01-01T00:00:00.000000000Z".to_string(),
            transactions: vec![Transaction {
                sender: "Alice".to_string(),
                receiver: "Bob".to_string(),
                amount: 100.0,
                signature: vec![1, 2, 3, 4],
            }],
            previous_hash: "00ab".to_string(),
            hash: String::new(),
            nonce: 42,
        }
    }

    #[test]
    fn test_hash_is_deterministic() {
        let block = sample_block();
        let first = calculate_hash(&block);
        assert_eq!(first, calculate_hash(&block));
        assert_eq!(first, calculate_hash(&block.clone()));
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_stored_hash_is_not_an_input() {
        let block = sample_block();
        let mut with_hash = block.clone();
        with_hash.hash = "ffff".to_string();
        assert_eq!(calculate_hash(&block), calculate_hash(&with_hash));
    }

    #[test]
    fn test_every_field_changes_hash() {
        let base = sample_block();
        let original = calculate_hash(&base);

        let mut b = base.clone();
        b.index += 1;
        assert_ne!(original, calculate_hash(&b));

        let mut b = base.clone();
        b.timestamp.push('0');
        assert_ne!(original, calculate_hash(&b));

        let mut b = base.clone();
        b.previous_hash = "00ac".to_string();
        assert_ne!(original, calculate_hash(&b));

        let mut b = base.clone();
        b.nonce += 1;
        assert_ne!(original, calculate_hash(&b));

        let mut b = base.clone();
        b.transactions[0].signature[3] ^= 0x80;
        assert_ne!(original, calculate_hash(&b));

        let mut b = base.clone();
        b.transactions[0].amount = 100.000_000_1;
        assert_ne!(original, calculate_hash(&b));

        let mut b = base.clone();
        b.transactions.clear();
        assert_ne!(original, calculate_hash(&b));
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        let mut a = sample_block();
        a.transactions[0].sender = "AB".to_string();
        a.transactions[0].receiver = "C".to_string();

        let mut b = a.clone();
        b.transactions[0].sender = "A".to_string();
        b.transactions[0].receiver = "BC".to_string();

        assert_ne!(calculate_hash(&a), calculate_hash(&b));
    }
}
