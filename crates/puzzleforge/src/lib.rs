//! # PUZZLEFORGE
//!
//! Procedural puzzle engine with quality and variety gates.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       PuzzleEngine                       │
//! ├──────────────┬──────────────┬──────────────┬─────────────┤
//! │ PuzzleCache  │  Dispatcher  │   Assessor   │   Variety   │
//! │  LRU + TTL   │  algorithms  │ quality gate │ dedup gate  │
//! ├──────────────┴──────────────┴──────────────┴─────────────┤
//! │     PerformanceMonitor        │     Batch orchestration  │
//! └───────────────────────────────┴──────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use puzzleforge::{Difficulty, GenerationConfig, PuzzleEngine, PuzzleType};
//!
//! let engine = PuzzleEngine::default();
//! let config = GenerationConfig::new(PuzzleType::Word, Difficulty::Hard).with_seed(7);
//! let puzzle = engine.generate(&config)?;
//! let again = engine.generate(&config)?; // cache hit
//! assert_eq!(puzzle.id, again.id);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod batch;
pub mod cache;
pub mod engine;
pub mod stats;

pub use batch::{run_batch, BatchOutcome, BatchRequest};
pub use cache::{generate_cache_key, CacheDiagnostics, CacheEntry, OptimizeOutcome, PuzzleCache};
pub use engine::PuzzleEngine;
pub use stats::{
    analyze_bottlenecks, render_performance_report, Bottleneck, PerformanceMonitor, PerformanceStats,
    RollingWindow, Severity,
};

// Re-export the component crates
pub use puzzleforge_core as core;
pub use puzzleforge_procedural as procedural;
pub use puzzleforge_quality as quality;

pub use puzzleforge_core::{
    ConfigError, Difficulty, EngineConfig, GeneratedPuzzle, GenerationConfig, GenerationError,
    GenerationResult, Parameters, PuzzleType,
};
