//! Proof-of-work nonce search

use crate::blockchain::{calculate_hash, Block};
use crate::error::ChainError;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How often the bounded search looks at the clock.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Optional budget for a nonce search. The default is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MiningLimits {
    /// Maximum number of hashes to try.
    pub max_iterations: Option<u64>,
    /// Wall-clock budget measured from the start of the search.
    pub timeout: Option<Duration>,
}

impl MiningLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The run of `'0'` characters a hash must start with.
pub fn target_prefix(difficulty: usize) -> String {
    "0".repeat(difficulty)
}

/// True iff the hex `hash` begins with at least `difficulty` zero characters.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}

/// Searches nonces from 0 upward until the block hash meets `difficulty`.
///
/// Writes the winning hash and nonce into `block` and returns them. There is
/// no iteration bound; use [`mine_block_bounded`] when one is needed.
pub fn mine_block(block: &mut Block, difficulty: usize) -> (String, u64) {
    debug!(index = block.index, difficulty, "mining block");
    let start = Instant::now();
    block.nonce = 0;
    loop {
        let hash = calculate_hash(block);
        if meets_difficulty(&hash, difficulty) {
            return finish(block, hash, start);
        }
        block.nonce = block.nonce.wrapping_add(1);
    }
}

/// Like [`mine_block`], but gives up once `limits` are exhausted.
///
/// On [`ChainError::MiningExhausted`] the block's `hash` is left untouched and
/// the block must not be appended.
pub fn mine_block_bounded(
    block: &mut Block,
    difficulty: usize,
    limits: &MiningLimits,
) -> Result<(String, u64), ChainError> {
    debug!(index = block.index, difficulty, ?limits, "mining block with limits");
    let start = Instant::now();
    let deadline = limits.timeout.map(|t| start + t);
    let mut iterations: u64 = 0;
    block.nonce = 0;

    loop {
        if limits.max_iterations.is_some_and(|max| iterations >= max) {
            return Err(exhausted(block, iterations));
        }
        if let Some(deadline) = deadline {
            if iterations % DEADLINE_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                return Err(exhausted(block, iterations));
            }
        }

        let hash = calculate_hash(block);
        iterations += 1;
        if meets_difficulty(&hash, difficulty) {
            return Ok(finish(block, hash, start));
        }
        block.nonce = block.nonce.wrapping_add(1);
    }
}

fn finish(block: &mut Block, hash: String, start: Instant) -> (String, u64) {
    info!(
        index = block.index,
        nonce = block.nonce,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "mined block {}",
        hash
    );
    block.hash = hash.clone();
    (hash, block.nonce)
}

fn exhausted(block: &Block, iterations: u64) -> ChainError {
    warn!(index = block.index, iterations, "mining budget exhausted");
    ChainError::MiningExhausted { iterations }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Block {
        Block::new(1, Vec::new(), "abc".to_string())
    }

    #[test]
    fn test_meets_difficulty() {
        assert!(meets_difficulty("00ab", 0));
        assert!(meets_difficulty("00ab", 2));
        assert!(!meets_difficulty("00ab", 3));
        assert!(!meets_difficulty("0a0b", 2));
        assert!(meets_difficulty("000", 3));
        assert!(!meets_difficulty("00", 3));
        assert_eq!(target_prefix(4), "0000");
        assert_eq!(target_prefix(0), "");
    }

    #[test]
    fn test_difficulty_zero_stops_at_nonce_zero() {
        let mut block = candidate();
        block.nonce = 99;
        let (hash, nonce) = mine_block(&mut block, 0);
        assert_eq!(nonce, 0);
        assert_eq!(block.nonce, 0);
        assert_eq!(hash, calculate_hash(&block));
    }

    #[test]
    fn test_mined_hash_meets_target() {
        let mut block = candidate();
        let (hash, nonce) = mine_block(&mut block, 2);
        assert!(hash.starts_with("00"));
        assert_eq!(block.hash, hash);
        assert_eq!(block.nonce, nonce);
        assert_eq!(calculate_hash(&block), hash);
    }

    #[test]
    fn test_bounded_matches_unbounded() {
        let mut a = candidate();
        let mut b = a.clone();
        let unbounded = mine_block(&mut a, 2);
        let bounded = mine_block_bounded(&mut b, 2, &MiningLimits::unbounded()).unwrap();
        assert_eq!(unbounded, bounded);
    }

    #[test]
    fn test_iteration_cap_exhausts() {
        let mut block = candidate();
        // 64 leading zeros is out of reach.
        let limits = MiningLimits::unbounded().with_max_iterations(100);
        let err = mine_block_bounded(&mut block, 64, &limits).unwrap_err();
        assert!(matches!(err, ChainError::MiningExhausted { iterations: 100 }));
        assert!(block.hash.is_empty());
    }

    #[test]
    fn test_zero_timeout_exhausts_immediately() {
        let mut block = candidate();
        let limits = MiningLimits::unbounded().with_timeout(Duration::ZERO);
        let err = mine_block_bounded(&mut block, 64, &limits).unwrap_err();
        assert!(matches!(err, ChainError::MiningExhausted { iterations: 0 }));
    }
}
