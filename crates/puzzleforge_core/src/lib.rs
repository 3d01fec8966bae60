//! # PUZZLEFORGE Core
//!
//! Shared data model for the puzzle generation engine.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: `(type, difficulty, parameters, seed)` fully determines
//!    a puzzle's content and solution
//! 2. **Request-local randomness**: every generation call owns its PRNG
//! 3. **Values, not panics**: bad input becomes an error or a report
//! 4. **Serializable**: every artifact round-trips through JSON
//!
//! ## Core Components
//!
//! - `GenerationConfig`: what to generate
//! - `GeneratedPuzzle`: the finished artifact
//! - `QualityMetrics`: five independent scores in `[0, 1]`
//! - `PuzzleSeed`: seed newtype that hands out independent PRNG streams
//! - `EngineConfig`: tunable engine limits loaded from TOML
//!
//! ## Example
//!
//! ```rust,ignore
//! use puzzleforge_core::{Difficulty, GenerationConfig, PuzzleType};
//!
//! let config = GenerationConfig::new(PuzzleType::Math, Difficulty::Easy).with_seed(42);
//! assert_eq!(config.seed, Some(42));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod digest;
pub mod error;
pub mod seed;
pub mod tables;
pub mod types;

pub use config::{
    BatchSettings, CacheSettings, EngineConfig, GenerationSettings, StatsSettings,
    VarietySettings,
};
pub use digest::{canonical_json, parameter_signature, sha256_hex};
pub use error::{ConfigError, GenerationError, GenerationResult};
pub use seed::PuzzleSeed;
pub use types::{
    Answer, CellAnswer, Difficulty, GeneratedPuzzle, GenerationConfig, LogicClue, LogicContent,
    MathContent, ParamKind, ParamValue, Parameters, PatternContent, PuzzleContent,
    PuzzleMetadata, PuzzleType, QualityMetrics, Solution, VisualContent, WordContent,
};
