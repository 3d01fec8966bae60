//! # Engine Configuration
//!
//! All tunable engine limits, loaded once at startup from TOML.
//!
//! Every field has a default, so an empty file (or no file) yields the
//! stock engine:
//!
//! ```toml
//! [cache]
//! capacity = 10000
//! default_ttl_ms = 3600000
//!
//! [variety]
//! uniqueness_window_secs = 86400
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Dispatcher and gate retry limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Retries after an unsolvable draw before `GenerationExhausted`.
    pub max_solvability_retries: u32,
    /// Whole-pipeline attempts when quality/variety gates reject.
    pub max_gate_attempts: u32,
    /// Reject configs whose parameters fail schema validation.
    pub strict_parameters: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_solvability_retries: 3,
            max_gate_attempts: 5,
            strict_parameters: false,
        }
    }
}

/// Cache sizing and maintenance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Maximum number of entries.
    pub capacity: usize,
    /// TTL applied when the caller gives none (ms).
    pub default_ttl_ms: u64,
    /// Occupancy ratio above which maintenance evicts low-usage entries.
    pub optimize_occupancy_ratio: f64,
    /// Fraction of remaining entries evicted by maintenance.
    pub optimize_evict_fraction: f64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            default_ttl_ms: 60 * 60 * 1000,
            optimize_occupancy_ratio: 0.8,
            optimize_evict_fraction: 0.2,
        }
    }
}

/// Uniqueness history and variety buckets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarietySettings {
    /// Maximum admitted puzzles kept for similarity search.
    pub max_history: usize,
    /// Sliding window for similarity search (seconds).
    pub uniqueness_window_secs: i64,
    /// Hashes kept per `(type, difficulty)` bucket.
    pub bucket_ring_capacity: usize,
    /// Pairwise similarity at or above which two puzzles count as similar.
    pub similarity_threshold: f64,
    /// Minimum uniqueness score for admission.
    pub min_uniqueness_score: f64,
    /// Window over which bucket freshness decays to zero (seconds).
    pub freshness_window_secs: i64,
}

impl Default for VarietySettings {
    fn default() -> Self {
        Self {
            max_history: 1_000,
            uniqueness_window_secs: 24 * 60 * 60,
            bucket_ring_capacity: 100,
            similarity_threshold: 0.75,
            min_uniqueness_score: 0.8,
            freshness_window_secs: 60 * 60,
        }
    }
}

/// Batch orchestration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Group width for parallel batches when the caller gives none.
    pub default_batch_size: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            default_batch_size: 10,
        }
    }
}

/// Rolling performance statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSettings {
    /// Durations kept per rolling average.
    pub rolling_window: usize,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            rolling_window: 100,
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dispatcher and gate retry limits.
    pub generation: GenerationSettings,
    /// Cache sizing and maintenance.
    pub cache: CacheSettings,
    /// Uniqueness history and variety buckets.
    pub variety: VarietySettings,
    /// Batch orchestration.
    pub batch: BatchSettings,
    /// Rolling statistics.
    pub stats: StatsSettings,
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and
    /// `ConfigError::Invalid` for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise as
    /// `from_toml_str`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks every limit is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.cache.capacity == 0 {
            return invalid("cache.capacity must be > 0");
        }
        if !unit_ratio(self.cache.optimize_occupancy_ratio) {
            return invalid("cache.optimize_occupancy_ratio must be in (0, 1]");
        }
        if !unit_ratio(self.cache.optimize_evict_fraction) {
            return invalid("cache.optimize_evict_fraction must be in (0, 1]");
        }
        if self.variety.max_history == 0 || self.variety.bucket_ring_capacity == 0 {
            return invalid("variety history sizes must be > 0");
        }
        if self.variety.uniqueness_window_secs <= 0 || self.variety.freshness_window_secs <= 0 {
            return invalid("variety windows must be > 0");
        }
        if !unit_ratio(self.variety.similarity_threshold) {
            return invalid("variety.similarity_threshold must be in (0, 1]");
        }
        if !(0.0..=1.0).contains(&self.variety.min_uniqueness_score) {
            return invalid("variety.min_uniqueness_score must be in [0, 1]");
        }
        if self.batch.default_batch_size == 0 {
            return invalid("batch.default_batch_size must be > 0");
        }
        if self.stats.rolling_window == 0 {
            return invalid("stats.rolling_window must be > 0");
        }
        Ok(())
    }
}

fn unit_ratio(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.cache.capacity, 10_000);
        assert_eq!(config.generation.max_solvability_retries, 3);
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            r"
            [cache]
            capacity = 50

            [batch]
            default_batch_size = 4
            ",
        )
        .unwrap();
        assert_eq!(config.cache.capacity, 50);
        assert_eq!(config.cache.default_ttl_ms, 3_600_000);
        assert_eq!(config.batch.default_batch_size, 4);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = EngineConfig::from_toml_str("[cache]\ncapacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = EngineConfig::from_toml_str("[cache\ncapacity = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
