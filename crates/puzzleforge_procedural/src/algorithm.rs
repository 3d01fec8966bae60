//! # Algorithm Seams
//!
//! The two traits every puzzle type plugs into.
//!
//! - `PuzzleAlgorithm` turns a difficulty, parameters and a PRNG into a
//!   draft puzzle.
//! - `SolvabilityChecker` independently decides whether a draft's content
//!   has exactly the draft's answer.
//!
//! The dispatcher owns the retry loop; algorithms never retry themselves.

use puzzleforge_core::{
    Answer, Difficulty, ParamValue, Parameters, PuzzleContent, PuzzleType, QualityMetrics, Solution,
};
use rand_chacha::ChaCha8Rng;

/// Input to one drafting attempt.
#[derive(Debug, Clone, Copy)]
pub struct DraftRequest<'a> {
    /// Difficulty being generated.
    pub difficulty: Difficulty,
    /// Parameters already clamped to the schema. Absent entries fall back
    /// to the difficulty tables.
    pub parameters: &'a Parameters,
}

impl<'a> DraftRequest<'a> {
    /// Creates a request.
    #[must_use]
    pub const fn new(difficulty: Difficulty, parameters: &'a Parameters) -> Self {
        Self {
            difficulty,
            parameters,
        }
    }

    /// A whole-number parameter, or `fallback` when absent.
    #[must_use]
    pub fn size(&self, name: &str, fallback: usize) -> usize {
        self.parameters
            .get(name)
            .and_then(ParamValue::as_f64)
            .map_or(fallback, |n| n.round().max(0.0) as usize)
    }

    /// A flag parameter, or `fallback` when absent.
    #[must_use]
    pub fn flag(&self, name: &str, fallback: bool) -> bool {
        self.parameters
            .get(name)
            .and_then(ParamValue::as_bool)
            .unwrap_or(fallback)
    }

    /// A text parameter.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&'a str> {
        self.parameters.get(name).and_then(ParamValue::as_str)
    }

    /// A list parameter.
    #[must_use]
    pub fn list(&self, name: &str) -> Option<&'a [String]> {
        self.parameters.get(name).and_then(ParamValue::as_list)
    }
}

/// A puzzle before the dispatcher stamps identity and metadata on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    /// Player-facing title.
    pub title: String,
    /// Player-facing description.
    pub description: String,
    /// Structured payload.
    pub content: PuzzleContent,
    /// Answer, explanation, steps.
    pub solution: Solution,
    /// Ordered hints.
    pub hints: Vec<String>,
    /// Metrics before the difficulty adjustment.
    pub metrics: QualityMetrics,
    /// Solvability confidence once the checker agrees.
    pub solvability_score: f64,
    /// Validation confidence.
    pub validation_score: f64,
    /// Estimated solve time in seconds.
    pub estimated_solve_time: u32,
}

/// Synthesizes one puzzle type.
pub trait PuzzleAlgorithm: Send + Sync {
    /// The type this algorithm produces.
    fn puzzle_type(&self) -> PuzzleType;

    /// Builds a draft. All randomness comes from `rng`.
    fn draft(&self, request: &DraftRequest<'_>, rng: &mut ChaCha8Rng) -> Draft;
}

/// Outcome of a solvability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The content determines exactly the given answer.
    Solvable,
    /// It does not, and why.
    Unsolvable(String),
}

impl Verdict {
    /// True for `Solvable`.
    #[must_use]
    pub const fn is_solvable(&self) -> bool {
        matches!(self, Self::Solvable)
    }
}

/// Independently verifies a draft.
pub trait SolvabilityChecker: Send + Sync {
    /// Checks that `content` has a unique solution equal to `answer`.
    fn check(&self, content: &PuzzleContent, answer: &Answer) -> Verdict;
}

/// Shorthand for a mismatched content kind.
pub(crate) fn wrong_kind(expected: PuzzleType) -> Verdict {
    Verdict::Unsolvable(format!("content is not a {expected} puzzle"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accessors() {
        let mut params = Parameters::new();
        params.insert("gridSize".into(), ParamValue::Number(4.6));
        params.insert("includeClues".into(), ParamValue::Bool(false));
        params.insert("wordDatabase".into(), ParamValue::from("nature"));

        let request = DraftRequest::new(Difficulty::Easy, &params);
        assert_eq!(request.size("gridSize", 3), 5);
        assert_eq!(request.size("missing", 3), 3);
        assert!(!request.flag("includeClues", true));
        assert_eq!(request.text("wordDatabase"), Some("nature"));
        assert!(request.list("patternTypes").is_none());
    }
}
