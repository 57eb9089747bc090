//! Benchmark configuration.
//!
//! Defaults reproduce the reference workload: 125,000 initial products,
//! 25,000 appended during the update phase, chunks of 5,000 rows. A JSON file
//! may override any field; command-line flags override the file.

use crate::error::{Error, Result};
use crate::product::MAX_ITEM_INDEX;
use crate::strategy::{Strategy, DEFAULT_BATCH_SIZE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INITIAL_COUNT: usize = 125_000;
pub const DEFAULT_EXTRA_COUNT: usize = 25_000;

/// Where the products table lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// SQLite, on disk when a database path is given, otherwise in memory
    #[default]
    Sqlite,
    /// In-process ordered map
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub initial_count: usize,
    pub extra_count: usize,
    pub batch_size: usize,
    /// Fixed RNG seed; unseeded when absent
    pub seed: Option<u64>,
    pub backend: Backend,
    pub database: Option<PathBuf>,
    /// Strategy names, run in this order
    pub strategies: Vec<String>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            initial_count: DEFAULT_INITIAL_COUNT,
            extra_count: DEFAULT_EXTRA_COUNT,
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
            backend: Backend::Sqlite,
            database: None,
            strategies: vec![
                "conditional".to_string(),
                "single".to_string(),
                "chunked".to_string(),
            ],
        }
    }
}

impl BenchConfig {
    /// Load a file as-is. Callers validate after applying their overrides.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be greater than 0".to_string()));
        }
        let total = self.initial_count.checked_add(self.extra_count);
        if total.map_or(true, |total| total as u64 > MAX_ITEM_INDEX) {
            return Err(Error::Config(format!(
                "initial_count + extra_count must not exceed {MAX_ITEM_INDEX}"
            )));
        }
        if self.strategies.is_empty() {
            return Err(Error::Config("at least one strategy is required".to_string()));
        }
        if self.backend == Backend::Memory && self.database.is_some() {
            return Err(Error::Config(
                "a database path only applies to the sqlite backend".to_string(),
            ));
        }
        self.resolve_strategies().map(|_| ())
    }

    /// Parse strategy names. A bare `chunked` takes the configured batch size.
    pub fn resolve_strategies(&self) -> Result<Vec<Strategy>> {
        self.strategies
            .iter()
            .map(|name| {
                let strategy = match name.parse::<Strategy>()? {
                    Strategy::ChunkedBulkUpsert { .. } if !name.contains(':') => {
                        Strategy::ChunkedBulkUpsert {
                            batch_size: self.batch_size,
                        }
                    }
                    other => other,
                };
                strategy.validate()?;
                Ok(strategy)
            })
            .collect()
    }
}
