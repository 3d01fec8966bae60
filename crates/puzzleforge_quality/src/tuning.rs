//! # Parameter Tuning
//!
//! Validation, clamping, difficulty scaling and local-search tuning of
//! algorithm parameters.
//!
//! ## Tuning Is Heuristic
//!
//! `tune_parameters` is a single-pass local search. It builds at most five
//! candidates per numeric parameter (×0.8 … ×1.2 of the current value),
//! scores each with a closed-form stand-in for quality that favours values
//! away from their bounds, and keeps the best one only if it beats the
//! observed baseline. It never regenerates puzzles and is not guaranteed
//! to find an optimum.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use puzzleforge_core::{
    Difficulty, GeneratedPuzzle, GenerationError, GenerationResult, ParamValue, Parameters,
    PuzzleType,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::schema::{schema_for, AlgorithmParameter, AlgorithmSchema, ConstraintContext};

/// Variation factors applied to each numeric parameter.
pub const CANDIDATE_FACTORS: [f64; 5] = [0.8, 0.9, 1.0, 1.1, 1.2];

/// Records kept in the optimization history.
pub const HISTORY_LIMIT: usize = 1_000;

/// Baseline used when there are no recent puzzles.
const NEUTRAL_BASELINE: f64 = 0.5;

/// Result of parameter validation. Failures are data, not errors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// No errors.
    pub valid: bool,
    /// Type, range and constraint failures.
    pub errors: Vec<String>,
    /// Ignored parameters.
    pub warnings: Vec<String>,
}

/// Scores behind a tuning decision.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TuningMetrics {
    /// Mean quality of the recent puzzles (0.5 if none).
    pub original_quality: f64,
    /// Score of the chosen parameters.
    pub optimized_quality: f64,
    /// Mean solvability of the recent puzzles (0.5 if none).
    pub baseline_solvability: f64,
    /// Distinct candidates scored.
    pub candidates_evaluated: usize,
}

/// Result of `ParameterTuner::tune_parameters`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TuningResult {
    /// Parameters passed in.
    pub original_params: Parameters,
    /// Best parameters found (the originals if nothing beat the baseline).
    pub optimized_params: Parameters,
    /// `optimized_quality - original_quality`, never negative.
    pub improvement_score: f64,
    /// Scores behind the decision.
    pub metrics: TuningMetrics,
}

/// One tuning run.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRecord {
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
    /// Puzzle type tuned.
    pub puzzle_type: PuzzleType,
    /// Parameters chosen.
    pub parameters: Parameters,
    /// Score of the chosen parameters.
    pub quality_score: f64,
    /// Baseline solvability.
    pub solvability_score: f64,
}

/// Result of `ParameterTuner::recommend_parameter_adjustments`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Adjustments {
    /// Parameters to override.
    pub adjustments: Parameters,
    /// One line per adjustment or piece of advice.
    pub reasoning: Vec<String>,
}

impl Adjustments {
    /// True when there is nothing to change and nothing to say.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjustments.is_empty() && self.reasoning.is_empty()
    }
}

/// Portable parameter set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterExport {
    /// Puzzle type the parameters belong to.
    pub puzzle_type: PuzzleType,
    /// Schema version at export time.
    pub version: String,
    /// The parameters.
    pub parameters: Parameters,
    /// Export time.
    pub timestamp: DateTime<Utc>,
}

/// Owns tuning history; schemas are static.
#[derive(Default)]
pub struct ParameterTuner {
    history: RwLock<Vec<OptimizationRecord>>,
}

impl ParameterTuner {
    /// Creates a tuner with empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The schema of a puzzle type.
    #[must_use]
    pub fn schema(&self, puzzle_type: PuzzleType) -> &'static AlgorithmSchema {
        schema_for(puzzle_type)
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Validates parameters in a medium-difficulty context.
    #[must_use]
    pub fn validate_parameters(&self, puzzle_type: PuzzleType, params: &Parameters) -> ValidationReport {
        self.validate_parameters_for(puzzle_type, Difficulty::Medium, params)
    }

    /// Validates parameters by type name. An unknown name is reported as an
    /// error in the result.
    #[must_use]
    pub fn validate_named(&self, puzzle_type: &str, params: &Parameters) -> ValidationReport {
        match puzzle_type.parse::<PuzzleType>() {
            Ok(t) => self.validate_parameters(t, params),
            Err(_) => ValidationReport {
                valid: false,
                errors: vec![format!("Unknown puzzle type: {puzzle_type}")],
                warnings: Vec::new(),
            },
        }
    }

    /// Validates parameters for a specific difficulty.
    ///
    /// Absent parameters are skipped (they take defaults). Constraints are
    /// evaluated over the supplied parameters with defaults filled in.
    #[must_use]
    pub fn validate_parameters_for(
        &self,
        puzzle_type: PuzzleType,
        difficulty: Difficulty,
        params: &Parameters,
    ) -> ValidationReport {
        let schema = schema_for(puzzle_type);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for param in schema.parameters {
            let Some(value) = params.get(param.name) else {
                continue;
            };
            if value.kind() != param.kind {
                errors.push(format!("Parameter {} must be of type {}", param.name, param.kind));
                continue;
            }
            if let Some(n) = value.as_f64() {
                if let Some(min) = param.min.filter(|min| n < *min) {
                    errors.push(format!("{} must be >= {min}", param.name));
                }
                if let Some(max) = param.max.filter(|max| n > *max) {
                    errors.push(format!("{} must be <= {max}", param.name));
                }
            }
        }

        for name in params.keys() {
            if schema.parameter(name).is_none() {
                warnings.push(format!("Unknown parameter {name} will be ignored"));
            }
        }

        let resolved = schema.resolve(params);
        let ctx = ConstraintContext {
            difficulty,
            puzzle_type,
            parameters: &resolved,
        };
        for constraint in schema.constraints {
            if !(constraint.condition)(&ctx) {
                errors.push(constraint.message.to_string());
            }
        }

        ValidationReport {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Keeps schema-known parameters of the declared kind, clamping numbers.
    ///
    /// Unknown or mistyped entries are dropped; absent ones stay absent.
    #[must_use]
    pub fn clamp_parameters(&self, puzzle_type: PuzzleType, params: &Parameters) -> Parameters {
        let schema = schema_for(puzzle_type);
        params
            .iter()
            .filter_map(|(name, value)| {
                let param = schema.parameter(name)?;
                if value.kind() != param.kind {
                    return None;
                }
                let value = match value {
                    ParamValue::Number(n) => ParamValue::Number(param.clamp(*n)),
                    other => other.clone(),
                };
                Some((name.clone(), value))
            })
            .collect()
    }

    // =========================================================================
    // DIFFICULTY SCALING
    // =========================================================================

    /// Every default, numerics scaled by the difficulty multiplier, rounded
    /// and clamped.
    #[must_use]
    pub fn optimize_for_difficulty(&self, puzzle_type: PuzzleType, difficulty: Difficulty) -> Parameters {
        let multiplier = difficulty.tuning_multiplier();
        schema_for(puzzle_type)
            .parameters
            .iter()
            .map(|param| {
                let value = match param.default.as_f64() {
                    Some(default) => ParamValue::Number(param.clamp((default * multiplier).round())),
                    None => param.default.to_value(),
                };
                (param.name.to_string(), value)
            })
            .collect()
    }

    // =========================================================================
    // TUNING
    // =========================================================================

    /// Local heuristic search around `current`; see the module docs.
    #[must_use]
    pub fn tune_parameters(
        &self,
        puzzle_type: PuzzleType,
        current: &Parameters,
        recent: &[GeneratedPuzzle],
    ) -> TuningResult {
        let schema = schema_for(puzzle_type);
        let original_quality = average(recent, |p| p.metrics().mean_quality());
        let baseline_solvability = average(recent, |p| p.metadata.solvability_score);

        let candidates = candidate_parameters(schema, current);
        let mut best_params = current.clone();
        let mut best_score = original_quality;
        for candidate in &candidates {
            let score = simulate_quality(schema, candidate);
            if score > best_score {
                best_score = score;
                best_params = candidate.clone();
            }
        }

        {
            let mut history = self.history.write();
            history.push(OptimizationRecord {
                timestamp: Utc::now(),
                puzzle_type,
                parameters: best_params.clone(),
                quality_score: best_score,
                solvability_score: baseline_solvability,
            });
            if history.len() > HISTORY_LIMIT {
                let excess = history.len() - HISTORY_LIMIT;
                history.drain(..excess);
            }
        }

        info!(
            puzzle_type = %puzzle_type,
            original_quality,
            optimized_quality = best_score,
            candidates = candidates.len(),
            "parameter tuning finished"
        );

        TuningResult {
            original_params: current.clone(),
            optimized_params: best_params,
            improvement_score: best_score - original_quality,
            metrics: TuningMetrics {
                original_quality,
                optimized_quality: best_score,
                baseline_solvability,
                candidates_evaluated: candidates.len(),
            },
        }
    }

    /// The most recent `limit` tuning records, oldest first.
    #[must_use]
    pub fn optimization_history(&self, limit: usize) -> Vec<OptimizationRecord> {
        let history = self.history.read();
        let skip = history.len().saturating_sub(limit);
        history[skip..].to_vec()
    }

    /// Parameter nudges for a described problem.
    ///
    /// Recognised phrases (case-insensitive): `too easy` raises every
    /// count/complexity parameter 30% over its default, `too hard` lowers
    /// them 30%, `slow` lowers count parameters 20%, `not solvable` yields
    /// advice only. Adjusted values are clamped to their bounds.
    #[must_use]
    pub fn recommend_parameter_adjustments(&self, puzzle_type: PuzzleType, issue: &str) -> Adjustments {
        let schema = schema_for(puzzle_type);
        let issue = issue.to_lowercase();
        let mut out = Adjustments::default();

        let mut nudge = |keywords: &[&str], factor: f64, verb: &str| {
            for param in schema.numeric() {
                let name = param.name.to_lowercase();
                if !keywords.iter().any(|k| name.contains(k)) {
                    continue;
                }
                let Some(default) = param.default.as_f64() else {
                    continue;
                };
                let value = param.clamp(round_like(param, default * factor));
                out.adjustments.insert(param.name.to_string(), ParamValue::Number(value));
                out.reasoning.push(format!("{verb} {}", param.name));
            }
        };

        if issue.contains("too easy") {
            nudge(&["count", "complexity"], 1.3, "Increased to raise difficulty:");
        }
        if issue.contains("too hard") {
            nudge(&["count", "complexity"], 0.7, "Decreased to lower difficulty:");
        }
        if issue.contains("slow") {
            nudge(&["count"], 0.8, "Reduced to improve generation speed:");
        }
        if issue.contains("not solvable") {
            out.reasoning
                .push("Consider reducing complexity or adjusting constraints".to_string());
        }

        debug!(
            puzzle_type = %puzzle_type,
            issue = %issue,
            adjusted = out.adjustments.len(),
            "parameter adjustments recommended"
        );
        out
    }

    // =========================================================================
    // EXPORT / IMPORT
    // =========================================================================

    /// Serializes a parameter set as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Serialization` if encoding fails.
    pub fn export_parameter_config(&self, puzzle_type: PuzzleType, params: &Parameters) -> GenerationResult<String> {
        let export = ParameterExport {
            puzzle_type,
            version: schema_for(puzzle_type).version.to_string(),
            parameters: params.clone(),
            timestamp: Utc::now(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Parses and validates an exported parameter set.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Serialization` for malformed JSON and
    /// `GenerationError::InvalidParameters` when validation fails.
    pub fn import_parameter_config(&self, json: &str) -> GenerationResult<ParameterExport> {
        let export: ParameterExport = serde_json::from_str(json)?;
        let report = self.validate_parameters(export.puzzle_type, &export.parameters);
        if !report.valid {
            return Err(GenerationError::InvalidParameters(report.errors));
        }
        Ok(export)
    }
}

fn average(puzzles: &[GeneratedPuzzle], f: impl Fn(&GeneratedPuzzle) -> f64) -> f64 {
    if puzzles.is_empty() {
        return NEUTRAL_BASELINE;
    }
    puzzles.iter().map(f).sum::<f64>() / puzzles.len() as f64
}

fn round_like(param: &AlgorithmParameter, value: f64) -> f64 {
    if param.is_integral() {
        value.round()
    } else {
        value
    }
}

/// Up to five distinct variations per numeric parameter.
fn candidate_parameters(schema: &AlgorithmSchema, current: &Parameters) -> Vec<Parameters> {
    let mut candidates: Vec<Parameters> = Vec::new();
    for param in schema.numeric() {
        let base = current
            .get(param.name)
            .and_then(ParamValue::as_f64)
            .or_else(|| param.default.as_f64())
            .unwrap_or_default();

        for factor in CANDIDATE_FACTORS {
            let value = round_like(param, param.clamp(base * factor));
            let mut candidate = current.clone();
            candidate.insert(param.name.to_string(), ParamValue::Number(value));
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Closed-form quality stand-in: 0.5 plus up to 0.1 per numeric parameter
/// for sitting away from its bounds.
fn simulate_quality(schema: &AlgorithmSchema, params: &Parameters) -> f64 {
    let mut score = 0.5;
    for param in schema.numeric() {
        let (Some(min), Some(max)) = (param.min, param.max) else {
            continue;
        };
        let value = params
            .get(param.name)
            .and_then(ParamValue::as_f64)
            .or_else(|| param.default.as_f64())
            .unwrap_or(min);
        let span = max - min;
        if span > 0.0 {
            let margin = (value - min).min(max - value).max(0.0);
            score += 0.2 * margin / span;
        }
    }
    score.min(1.0)
}
