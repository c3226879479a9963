//! powledger - a minimal append-only ledger secured by signatures and proof of work
//!
//! # Architecture
//!
//! ## Core Blockchain
//! - [`blockchain`] - Blocks, canonical block hashing, the ledger and chain validation
//! - [`transaction`] - Signed transfer records
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work nonce search, optionally bounded
//!
//! ## Cryptography
//! - [`crypto`] - Key pairs, signing and verification (secp256k1)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Blockchain
// ============================================================================
pub mod blockchain;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

pub use blockchain::{Block, Blockchain};
pub use crypto::KeyPair;
pub use error::{ChainError, Result};
pub use miner::MiningLimits;
pub use transaction::Transaction;
