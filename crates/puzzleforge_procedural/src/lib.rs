//! # PUZZLEFORGE Procedural
//!
//! Deterministic puzzle synthesis with real solvability checks.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: same type, difficulty, parameters and seed give the
//!    same content and solution
//! 2. **Request-local**: every attempt builds its own `ChaCha8Rng`
//! 3. **Verified**: a draft is only returned once its checker agrees the
//!    content has exactly the stated answer
//!
//! ## Core Components
//!
//! - `PuzzleAlgorithm`: one generator per puzzle type
//! - `SolvabilityChecker`: one independent solver per puzzle type
//! - `GenerationDispatcher`: routing, parameter clamping, retries, metadata
//!
//! ## Example
//!
//! ```rust,ignore
//! use puzzleforge_core::{Difficulty, GenerationConfig, PuzzleType};
//! use puzzleforge_procedural::GenerationDispatcher;
//!
//! let dispatcher = GenerationDispatcher::default();
//! let config = GenerationConfig::new(PuzzleType::Math, Difficulty::Easy).with_seed(42);
//! let puzzle = dispatcher.generate(&config)?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod algorithm;
pub mod dispatcher;
pub mod logic;
pub mod math;
pub mod pattern;
pub mod visual;
pub mod word;

pub use algorithm::{Draft, DraftRequest, PuzzleAlgorithm, SolvabilityChecker, Verdict};
pub use dispatcher::{adjust_metrics, engagement_score, GenerationDispatcher};
pub use logic::{LogicAlgorithm, LogicChecker};
pub use math::{evaluate, MathAlgorithm, MathChecker};
pub use pattern::{PatternAlgorithm, PatternChecker, PatternFamily};
pub use visual::{palette, GridRule, VisualAlgorithm, VisualChecker};
pub use word::{bank, WordAlgorithm, WordChecker, THEMES};
