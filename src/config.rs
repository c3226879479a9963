//! Configuration management for powledger

use crate::blockchain::DEFAULT_DIFFICULTY;
use crate::error::ChainError;
use crate::miner::MiningLimits;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "powledger.toml";

/// A SHA-256 hex digest has 64 characters; more leading zeros can never be found.
pub const MAX_DIFFICULTY: usize = 64;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub miner: MinerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MinerConfig {
    /// Hashes to try per block before giving up.
    #[serde(default)]
    pub max_iterations: Option<u64>,
    /// Wall-clock budget per block, e.g. `"30s"` or `"2m"`.
    #[serde(default)]
    pub timeout: Option<String>,
}

impl MinerConfig {
    pub fn limits(&self) -> Result<MiningLimits, ChainError> {
        let timeout = self
            .timeout
            .as_deref()
            .map(humantime::parse_duration)
            .transpose()
            .map_err(|e| ChainError::Config(format!("miner.timeout: {}", e)))?;
        Ok(MiningLimits {
            max_iterations: self.max_iterations,
            timeout,
        })
    }

    pub fn is_bounded(&self) -> bool {
        self.max_iterations.is_some() || self.timeout.is_some()
    }
}

fn default_difficulty() -> usize {
    DEFAULT_DIFFICULTY
}

/// Loads `path`, falling back to defaults when the file does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    let path = path.as_ref();
    let config = match fs::read_to_string(path) {
        Ok(config_str) => toml::from_str(&config_str)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} not found, using default configuration", path.display());
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };

    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.chain.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::Config(format!(
                "chain.difficulty must be at most {}, got {}",
                MAX_DIFFICULTY, self.chain.difficulty
            )));
        }

        if self.miner.max_iterations == Some(0) {
            return Err(ChainError::Config(
                "miner.max_iterations must be greater than zero".to_string(),
            ));
        }

        self.miner.limits()?;
        Ok(())
    }

    /// Replaces the chain difficulty, keeping the previous value if the new one is out of range.
    pub fn set_difficulty(&mut self, difficulty: usize) -> Result<(), ChainError> {
        let previous = self.chain.difficulty;
        self.chain.difficulty = difficulty;
        if let Err(e) = self.validate() {
            self.chain.difficulty = previous;
            return Err(e);
        }
        Ok(())
    }
}
