use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Configuration for building the substring index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Number of independently built shards (1 = single suffix array)
    pub shard_count: usize,
    /// Worker threads for sharded builds (0 = one per CPU)
    pub worker_threads: usize,
    /// Suffix count above which sorting switches to a parallel sort
    pub parallel_sort_threshold: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            shard_count: 1,
            worker_threads: 0,
            parallel_sort_threshold: 100_000,
        }
    }
}

/// Upper bound on `shard_count`; every shard is allocated up front
pub const MAX_SHARD_COUNT: usize = 4096;

impl IndexConfig {
    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(IndexError::InvalidConfig(
                "shard_count must be at least 1".to_string(),
            ));
        }
        if self.shard_count > MAX_SHARD_COUNT {
            return Err(IndexError::InvalidConfig(format!(
                "shard_count must be at most {}, got {}",
                MAX_SHARD_COUNT, self.shard_count
            )));
        }
        Ok(())
    }

    pub fn is_sharded(&self) -> bool {
        self.shard_count > 1
    }

    /// Load a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| IndexError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Size statistics for a built index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub shard_count: usize,
    pub record_count: usize,
    pub string_count: usize,
    /// Suffixes before duplicate merging (one per code point)
    pub suffix_count: usize,
    /// Nodes after duplicate merging
    pub node_count: usize,
    pub text_bytes: usize,
}

impl AddAssign for IndexStats {
    fn add_assign(&mut self, other: Self) {
        self.shard_count += other.shard_count;
        self.record_count += other.record_count;
        self.string_count += other.string_count;
        self.suffix_count += other.suffix_count;
        self.node_count += other.node_count;
        self.text_bytes += other.text_bytes;
    }
}
