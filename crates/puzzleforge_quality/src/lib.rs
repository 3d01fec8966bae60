//! # PUZZLEFORGE Quality
//!
//! The gates a generated puzzle passes through, and the tuning that feeds
//! back into generation.
//!
//! ## Components
//!
//! - `QualityAssessor`: threshold scoring, engagement, educational value,
//!   and the six-step validation pipeline
//! - `VarietyService`: sliding-window similarity search, per-bucket
//!   variety trackers and diversity metrics
//! - `ParameterTuner`: per-type parameter schemas, validation, clamping,
//!   difficulty scaling and heuristic tuning
//!
//! ## Gate Results Are Values
//!
//! Nothing here fails a puzzle by returning `Err`. A rejected puzzle comes
//! back as a report with `passes_standards = false` or `is_unique = false`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use puzzleforge_quality::{QualityAssessor, VarietyService};
//!
//! let report = QualityAssessor::new().assess(&puzzle);
//! if report.passes_standards {
//!     let uniqueness = variety.ensure_uniqueness(&puzzle);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod assessment;
pub mod schema;
pub mod similarity;
pub mod tuning;
pub mod variety;

#[cfg(test)]
mod fixtures;

pub use assessment::{
    ComprehensiveValidation, EducationalReport, EngagementFactors, EngagementReport,
    QualityAssessor, QualityReport, QualityThresholds, ValidationStep,
};
pub use schema::{
    schema_for, AlgorithmConstraint, AlgorithmParameter, AlgorithmSchema, ConstraintContext,
    DefaultValue,
};
pub use similarity::{content_hash, levenshtein, puzzle_similarity, string_similarity};
pub use tuning::{
    Adjustments, OptimizationRecord, ParameterExport, ParameterTuner, TuningMetrics,
    TuningResult, ValidationReport,
};
pub use variety::{
    recommend_parameter_variations, DiversityMetrics, SimilarMatch, UniquenessResult,
    UniquenessStatistics, VarietyService, VarietyTracker,
};
