use crate::error::ChainError;
use crate::miner::meets_difficulty;

use super::chain::Block;
use super::hashing::calculate_hash;

/// Checks `block` against its predecessor, reporting the first violation.
///
/// In order: linkage to `previous.hash`, a freshly recomputed hash equal to the
/// stored one, and the stored hash meeting `difficulty`.
pub fn check_block(block: &Block, previous: &Block, difficulty: usize) -> Result<(), ChainError> {
    if block.previous_hash != previous.hash {
        return Err(ChainError::InvalidBlockLinkage {
            expected: previous.hash.clone(),
            found: block.previous_hash.clone(),
        });
    }

    let recomputed = calculate_hash(block);
    if block.hash != recomputed {
        return Err(ChainError::HashMismatch {
            expected: recomputed,
            found: block.hash.clone(),
        });
    }

    if !meets_difficulty(&block.hash, difficulty) {
        return Err(ChainError::InvalidProofOfWork {
            difficulty,
            hash: block.hash.clone(),
        });
    }

    Ok(())
}

/// Walks every adjacent pair from block 1 on. The genesis block itself is not checked.
pub fn check_chain(blocks: &[Block], difficulty: usize) -> Result<(), ChainError> {
    for (i, pair) in blocks.windows(2).enumerate() {
        check_block(&pair[1], &pair[0], difficulty).map_err(|e| ChainError::InvalidChain {
            index: i + 1,
            source: Box::new(e),
        })?;
    }
    Ok(())
}
