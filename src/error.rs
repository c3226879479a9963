//! Error types for powledger

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("Invalid block linkage: expected previous hash {expected}, got {found}")]
    InvalidBlockLinkage { expected: String, found: String },

    #[error("Block hash mismatch: recomputed {expected}, stored {found}")]
    HashMismatch { expected: String, found: String },

    #[error("Invalid proof of work: hash {hash} does not have {difficulty} leading zeros")]
    InvalidProofOfWork { difficulty: usize, hash: String },

    #[error("Invalid chain at block {index}: {source}")]
    InvalidChain {
        index: usize,
        #[source]
        source: Box<ChainError>,
    },

    #[error("Mining gave up after {iterations} iterations")]
    MiningExhausted { iterations: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
