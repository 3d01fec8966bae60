//! # Puzzle Data Model
//!
//! Configs going in, artifacts coming out.
//!
//! A `GeneratedPuzzle` is created once by the dispatcher and never mutated
//! afterwards. A puzzle rejected by a gate is discarded, not repaired.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::tables;

// =============================================================================
// PUZZLE TYPE / DIFFICULTY
// =============================================================================

/// The five puzzle families the engine can generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleType {
    /// Deduction over a hidden assignment.
    Logic,
    /// Integer sequence completion.
    Pattern,
    /// Arithmetic expression evaluation.
    Math,
    /// Anagram word puzzles.
    Word,
    /// Symbol grid completion.
    Visual,
}

impl PuzzleType {
    /// Every puzzle type, in canonical order.
    pub const ALL: [Self; 5] = [Self::Logic, Self::Pattern, Self::Math, Self::Word, Self::Visual];

    /// Lowercase name used in keys and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logic => "logic",
            Self::Pattern => "pattern",
            Self::Math => "math",
            Self::Word => "word",
            Self::Visual => "visual",
        }
    }
}

impl fmt::Display for PuzzleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PuzzleType {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GenerationError::UnknownPuzzleType(s.to_string()))
    }
}

/// Difficulty level. Indexes every fixed engine table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Rating 2.
    Easy,
    /// Rating 5.
    Medium,
    /// Rating 7.
    Hard,
    /// Rating 9.
    Expert,
}

impl Difficulty {
    /// Every difficulty, easiest first.
    pub const ALL: [Self; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Expert];

    /// Index into the fixed engine tables.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
            Self::Expert => 3,
        }
    }

    /// Lowercase name used in keys and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
        }
    }

    /// Picks the entry for this difficulty from a four-entry table.
    #[inline]
    #[must_use]
    pub fn pick<T: Copy>(self, table: [T; 4]) -> T {
        table[self.index()]
    }

    /// Rating on the 1-10 scale.
    #[must_use]
    pub const fn rating(self) -> u8 {
        tables::DIFFICULTY_RATINGS[self.index()]
    }

    /// Time limit in seconds.
    #[must_use]
    pub const fn time_limit_secs(self) -> u32 {
        tables::TIME_LIMITS_SECS[self.index()]
    }

    /// Base points for a solve.
    #[must_use]
    pub const fn base_points(self) -> u32 {
        tables::BASE_POINTS[self.index()]
    }

    /// Clarity multiplier, always `<= 1.0`.
    #[must_use]
    pub const fn clarity_factor(self) -> f64 {
        tables::CLARITY_FACTORS[self.index()]
    }

    /// Multiplier for difficulty-scaled parameter defaults.
    #[must_use]
    pub const fn tuning_multiplier(self) -> f64 {
        tables::TUNING_MULTIPLIERS[self.index()]
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GenerationError::UnknownDifficulty(s.to_string()))
    }
}

// =============================================================================
// PARAMETERS
// =============================================================================

/// Declared kind of an algorithm parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// Numeric value, optionally bounded.
    Number,
    /// True/false flag.
    Boolean,
    /// Free-form text.
    String,
    /// List of strings.
    Array,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Array => "array",
        })
    }
}

/// A single parameter value. Serializes as a plain JSON scalar or array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// `true` / `false`.
    Bool(bool),
    /// Any JSON number.
    Number(f64),
    /// Any JSON string.
    Text(String),
    /// Array of strings.
    List(Vec<String>),
}

impl ParamValue {
    /// The kind this value satisfies.
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        match self {
            Self::Bool(_) => ParamKind::Boolean,
            Self::Number(_) => ParamKind::Number,
            Self::Text(_) => ParamKind::String,
            Self::List(_) => ParamKind::Array,
        }
    }

    /// Numeric value, if this is a number.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean value, if this is a flag.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// List value, if this is an array.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for ParamValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Parameter map. A `BTreeMap` so serialization order is canonical.
pub type Parameters = BTreeMap<String, ParamValue>;

// =============================================================================
// GENERATION CONFIG
// =============================================================================

/// What to generate. Immutable once handed to the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Puzzle family.
    pub puzzle_type: PuzzleType,
    /// Difficulty level.
    pub difficulty: Difficulty,
    /// Algorithm parameters. Absent entries fall back to defaults.
    #[serde(default)]
    pub parameters: Parameters,
    /// Optional seed. When absent one is drawn and recorded in metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GenerationConfig {
    /// Creates an unseeded config with no parameters.
    #[must_use]
    pub fn new(puzzle_type: PuzzleType, difficulty: Difficulty) -> Self {
        Self {
            puzzle_type,
            difficulty,
            parameters: Parameters::new(),
            seed: None,
        }
    }

    /// Parses type and difficulty names.
    ///
    /// # Errors
    ///
    /// Returns `UnknownPuzzleType` or `UnknownDifficulty` for unknown names.
    pub fn parse(puzzle_type: &str, difficulty: &str) -> Result<Self, GenerationError> {
        Ok(Self::new(puzzle_type.parse()?, difficulty.parse()?))
    }

    /// Sets the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets one parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    /// Replaces the whole parameter map.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }
}

// =============================================================================
// QUALITY METRICS
// =============================================================================

/// Five independent quality scalars, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// Constraint density, already capped by the difficulty factor.
    pub complexity: f64,
    /// Estimated novelty of this instance.
    pub uniqueness: f64,
    /// How readable the instructions are.
    pub clarity: f64,
    /// Confidence the puzzle can be solved.
    pub solvability: f64,
    /// Estimated player engagement.
    pub engagement_potential: f64,
}

impl QualityMetrics {
    /// Returns a copy with every field clamped into `[0, 1]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            complexity: self.complexity.clamp(0.0, 1.0),
            uniqueness: self.uniqueness.clamp(0.0, 1.0),
            clarity: self.clarity.clamp(0.0, 1.0),
            solvability: self.solvability.clamp(0.0, 1.0),
            engagement_potential: self.engagement_potential.clamp(0.0, 1.0),
        }
    }

    /// True when every field is in `[0, 1]`.
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        [
            self.complexity,
            self.uniqueness,
            self.clarity,
            self.solvability,
            self.engagement_potential,
        ]
        .iter()
        .all(|v| (0.0..=1.0).contains(v))
    }

    /// Mean of complexity, clarity, engagement and solvability.
    #[must_use]
    pub fn mean_quality(&self) -> f64 {
        (self.complexity + self.clarity + self.engagement_potential + self.solvability) / 4.0
    }
}

// =============================================================================
// CONTENT
// =============================================================================

/// One clue of a logic puzzle. Indexes refer to `variables` / `values`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LogicClue {
    /// The variable holds the value.
    Equality {
        /// Variable index.
        variable: usize,
        /// Value index.
        value: usize,
    },
    /// The variable does not hold the value.
    Inequality {
        /// Variable index.
        variable: usize,
        /// Value index.
        value: usize,
    },
    /// The first variable's value comes earlier in the value list.
    Position {
        /// Variable holding the earlier value.
        first: usize,
        /// Variable holding the later value.
        second: usize,
    },
}

/// Logic puzzle: match each variable to a distinct value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicContent {
    /// Variable names.
    pub variables: Vec<String>,
    /// Value names, in order (order matters for position clues).
    pub values: Vec<String>,
    /// Structured clues.
    pub clues: Vec<LogicClue>,
    /// Clues as player-facing text.
    pub clue_text: Vec<String>,
    /// Grid side length.
    pub grid_size: usize,
}

/// Pattern puzzle: an integer sequence with hidden terms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternContent {
    /// Sequence terms; `None` marks a hidden term.
    pub sequence: Vec<Option<i64>>,
    /// Total sequence length.
    pub sequence_length: usize,
}

/// Math puzzle: evaluate an expression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathContent {
    /// Expression text, e.g. `"7 + 3 * 2"`.
    pub expression: String,
    /// Number of operators.
    pub operation_count: usize,
    /// Operands are drawn from `1..=number_range`.
    pub number_range: i64,
}

/// Word puzzle: unscramble each word.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordContent {
    /// Scrambled letters, one entry per word.
    pub scrambles: Vec<String>,
    /// One clue per scramble.
    pub clues: Vec<String>,
    /// Theme of the word bank.
    pub theme: String,
    /// Number of words.
    pub word_count: usize,
}

/// Visual puzzle: a symbol grid with missing cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualContent {
    /// Rows of cells; `None` marks a missing cell.
    pub grid: Vec<Vec<Option<char>>>,
    /// Symbols that may appear.
    pub palette: Vec<char>,
    /// Grid side length.
    pub grid_size: usize,
    /// Pattern complexity level.
    pub complexity: usize,
}

/// Algorithm-specific puzzle payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PuzzleContent {
    /// Logic deduction.
    Logic(LogicContent),
    /// Sequence completion.
    Pattern(PatternContent),
    /// Expression evaluation.
    Math(MathContent),
    /// Anagrams.
    Word(WordContent),
    /// Grid completion.
    Visual(VisualContent),
}

impl PuzzleContent {
    /// The puzzle type this payload belongs to.
    #[must_use]
    pub const fn puzzle_type(&self) -> PuzzleType {
        match self {
            Self::Logic(_) => PuzzleType::Logic,
            Self::Pattern(_) => PuzzleType::Pattern,
            Self::Math(_) => PuzzleType::Math,
            Self::Word(_) => PuzzleType::Word,
            Self::Visual(_) => PuzzleType::Visual,
        }
    }

    /// True when the payload carries nothing to solve.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Logic(c) => c.variables.is_empty() || c.clues.is_empty(),
            Self::Pattern(c) => c.sequence.is_empty(),
            Self::Math(c) => c.expression.trim().is_empty(),
            Self::Word(c) => c.scrambles.is_empty(),
            Self::Visual(c) => c.grid.is_empty(),
        }
    }
}

// =============================================================================
// SOLUTION
// =============================================================================

/// A filled-in visual cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAnswer {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
    /// Symbol that belongs there.
    pub symbol: char,
}

/// Typed answer, one shape per puzzle type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Logic: variable name to value name.
    Assignment(BTreeMap<String, String>),
    /// Math: the expression's value.
    Number(i64),
    /// Pattern: hidden terms, in sequence order.
    Numbers(Vec<i64>),
    /// Word: unscrambled words, in clue order.
    Words(Vec<String>),
    /// Visual: missing cells, row-major.
    Cells(Vec<CellAnswer>),
}

impl Answer {
    /// True when the answer holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Assignment(map) => map.is_empty(),
            Self::Number(_) => false,
            Self::Numbers(items) => items.is_empty(),
            Self::Words(items) => items.is_empty(),
            Self::Cells(items) => items.is_empty(),
        }
    }
}

/// Answer plus explanation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// The answer.
    pub answer: Answer,
    /// Why the answer is right.
    pub explanation: String,
    /// Ordered solving steps.
    pub steps: Vec<String>,
}

// =============================================================================
// ARTIFACT
// =============================================================================

/// Generation metadata attached to every artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleMetadata {
    /// Algorithm name, e.g. `"MathExpressionAlgorithm"`.
    pub generation_method: String,
    /// When generation finished.
    pub generated_at: DateTime<Utc>,
    /// Seed that produced this exact artifact.
    pub seed: u64,
    /// Stable 16-hex-char digest of the parameter map.
    pub parameter_signature: String,
    /// Quality metrics computed at generation time.
    pub quality_metrics: QualityMetrics,
    /// Solvability confidence in `[0, 1]`.
    pub solvability_score: f64,
    /// Engagement estimate in `[0, 1]`.
    pub engagement_score: f64,
}

/// A finished puzzle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPuzzle {
    /// Opaque unique identifier.
    pub id: String,
    /// Puzzle family.
    #[serde(rename = "type")]
    pub puzzle_type: PuzzleType,
    /// Difficulty level.
    pub difficulty: Difficulty,
    /// Rating 1-10, derived from `difficulty`.
    pub difficulty_rating: u8,
    /// Player-facing title.
    pub title: String,
    /// Player-facing description.
    pub description: String,
    /// Algorithm-specific payload.
    pub content: PuzzleContent,
    /// Answer, explanation and steps.
    pub solution: Solution,
    /// Ordered hints.
    pub hints: Vec<String>,
    /// Time limit in seconds.
    pub time_limit: u32,
    /// Base points.
    pub base_points: u32,
    /// Generation metadata.
    pub metadata: PuzzleMetadata,
    /// Validation confidence in `[0, 1]`.
    pub validation_score: f64,
    /// Estimated solve time in seconds.
    pub estimated_solve_time: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl GeneratedPuzzle {
    /// Shorthand for the quality metrics in metadata.
    #[must_use]
    pub const fn metrics(&self) -> &QualityMetrics {
        &self.metadata.quality_metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_puzzle_type_parse() {
        assert_eq!("math".parse::<PuzzleType>(), Ok(PuzzleType::Math));
        assert_eq!(" Logic ".parse::<PuzzleType>(), Ok(PuzzleType::Logic));
        assert_eq!(
            "chess".parse::<PuzzleType>(),
            Err(GenerationError::UnknownPuzzleType("chess".to_string()))
        );
    }

    #[test]
    fn test_difficulty_tables() {
        assert_eq!(Difficulty::Easy.rating(), 2);
        assert_eq!(Difficulty::Expert.time_limit_secs(), 900);
        assert_eq!(Difficulty::Hard.base_points(), 250);
        assert!((Difficulty::Medium.tuning_multiplier() - 1.0).abs() < f64::EPSILON);
        assert_eq!(Difficulty::Hard.pick([1, 2, 3, 4]), 3);
    }

    #[test]
    fn test_param_value_json_is_plain() {
        let mut params = Parameters::new();
        params.insert("gridSize".into(), ParamValue::Number(4.0));
        params.insert("includeClues".into(), ParamValue::Bool(true));
        params.insert("patternTypes".into(), ParamValue::List(vec!["arithmetic".into()]));

        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(
            json,
            r#"{"gridSize":4.0,"includeClues":true,"patternTypes":["arithmetic"]}"#
        );

        let back: Parameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_config_parse_rejects_unknown() {
        assert!(GenerationConfig::parse("word", "hard").is_ok());
        assert_eq!(
            GenerationConfig::parse("word", "insane"),
            Err(GenerationError::UnknownDifficulty("insane".to_string()))
        );
    }

    #[test]
    fn test_metrics_clamped() {
        let metrics = QualityMetrics {
            complexity: 1.4,
            uniqueness: -0.2,
            clarity: 0.8,
            solvability: 1.0,
            engagement_potential: 0.5,
        };
        assert!(!metrics.is_in_range());
        assert!(metrics.clamped().is_in_range());
    }
}
