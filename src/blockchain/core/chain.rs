use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::miner::{mine_block, mine_block_bounded, MiningLimits};
use crate::transaction::Transaction;
use tracing::{info, warn};

use super::hashing::calculate_hash;
use super::validation::{check_block, check_chain};

pub const DEFAULT_DIFFICULTY: usize = 4;

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

/// A mined (or candidate) block.
///
/// The serde form is for display and tests, not storage. JSON keeps `f64`
/// amounts bit-exact, so a decoded block still hashes to its stored `hash`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: String,
    pub transactions: Vec<Transaction>,
    pub previous_hash: String,
    pub hash: String,
    pub nonce: u64,
}

impl Block {
    /// Unmined candidate stamped with the current time; `hash` is empty and `nonce` is 0.
    pub fn new(index: u64, transactions: Vec<Transaction>, previous_hash: String) -> Self {
        Block {
            index,
            timestamp: now_timestamp(),
            transactions,
            previous_hash,
            hash: String::new(),
            nonce: 0,
        }
    }

    pub fn calculate_hash(&self) -> String {
        calculate_hash(self)
    }
}

/// Append-only sequence of blocks starting at a genesis block.
///
/// Never empty. Each ledger is an independent value; nothing is shared between instances.
#[derive(Debug, Clone)]
pub struct Blockchain {
    pub(crate) blocks: Vec<Block>,
    difficulty: usize,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// New ledger at [`DEFAULT_DIFFICULTY`].
    pub fn new() -> Self {
        Self::with_difficulty(DEFAULT_DIFFICULTY)
    }

    pub fn with_difficulty(difficulty: usize) -> Self {
        Blockchain {
            blocks: vec![Self::create_genesis_block()],
            difficulty,
        }
    }

    pub fn from_config(config: &ChainConfig) -> Self {
        Self::with_difficulty(config.difficulty)
    }

    /// Genesis hash is computed directly; it is never mined.
    fn create_genesis_block() -> Block {
        let mut genesis = Block::new(0, Vec::new(), GENESIS_PREVIOUS_HASH.to_string());
        genesis.hash = calculate_hash(&genesis);
        genesis
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    /// The most recently appended block.
    pub fn tip(&self) -> &Block {
        // Non-empty: genesis is pushed at construction and nothing is ever removed.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn candidate(&self, transactions: Vec<Transaction>, previous_hash: String) -> Block {
        Block::new(self.blocks.len() as u64, transactions, previous_hash)
    }

    /// Assembles the next block and mines it at this ledger's difficulty.
    ///
    /// Blocks the caller until a nonce is found. The block is not appended.
    pub fn new_block(
        &self,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
    ) -> Block {
        let mut block = self.candidate(transactions, previous_hash.into());
        mine_block(&mut block, self.difficulty);
        block
    }

    /// [`Blockchain::new_block`] with a mining budget.
    pub fn new_block_bounded(
        &self,
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
        limits: &MiningLimits,
    ) -> Result<Block, ChainError> {
        let mut block = self.candidate(transactions, previous_hash.into());
        mine_block_bounded(&mut block, self.difficulty, limits)?;
        Ok(block)
    }

    /// Appends `block` if it validates against the tip.
    ///
    /// On rejection the ledger is unchanged and the reason is returned.
    pub fn add_block(&mut self, block: Block) -> Result<(), ChainError> {
        if let Err(e) = check_block(&block, self.tip(), self.difficulty) {
            warn!(index = block.index, "rejected block: {}", e);
            return Err(e);
        }
        info!(index = block.index, hash = %block.hash, "appended block");
        self.blocks.push(block);
        Ok(())
    }

    /// True iff `block` links to `previous`, its hash recomputes, and the hash meets
    /// this ledger's difficulty.
    pub fn validate_block(&self, block: &Block, previous: &Block) -> bool {
        check_block(block, previous, self.difficulty).is_ok()
    }

    /// Reason-bearing whole-chain check; reports the first failing block index.
    pub fn verify_chain(&self) -> Result<(), ChainError> {
        check_chain(&self.blocks, self.difficulty)
    }

    pub fn is_chain_valid(&self) -> bool {
        self.verify_chain().is_ok()
    }
}
