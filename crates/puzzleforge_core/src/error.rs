//! # Engine Error Types
//!
//! Errors that can escape the generation engine.
//!
//! Quality and variety gate failures are NOT errors. They come back as
//! structured reports (`passes_standards = false`, `is_unique = false`) so
//! the caller can decide whether to regenerate.

use thiserror::Error;

use crate::types::PuzzleType;

/// Errors that can occur while generating a puzzle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The requested puzzle type does not exist. Caller error, not retryable.
    #[error("unknown puzzle type: {0}")]
    UnknownPuzzleType(String),

    /// The requested difficulty does not exist. Caller error, not retryable.
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    /// Every bounded retry produced an unusable puzzle.
    ///
    /// Transient: the caller may retry, ideally with a different config.
    #[error("generation exhausted for {puzzle_type} after {attempts} attempts: {reason}")]
    GenerationExhausted {
        /// Type that was being generated.
        puzzle_type: PuzzleType,
        /// Number of attempts made.
        attempts: u32,
        /// Why the last attempt was rejected.
        reason: String,
    },

    /// Parameters failed schema validation (strict mode only).
    #[error("invalid parameters: {}", .0.join("; "))]
    InvalidParameters(Vec<String>),

    /// A puzzle could not be serialized or deserialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Errors that can occur while loading engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for `EngineConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
