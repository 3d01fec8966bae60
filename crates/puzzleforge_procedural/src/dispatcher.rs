//! # Generation Dispatcher
//!
//! Routes a `GenerationConfig` to its algorithm and owns the solvability
//! retry loop.
//!
//! ## Attempt Seeds
//!
//! Attempt 0 uses the request seed; attempt `n` uses `seed.derive(n)`. The
//! seed recorded in metadata is the one that produced the returned draft,
//! so replaying it reproduces the artifact on the first attempt.
//!
//! ## No Gating Here
//!
//! The dispatcher checks solvability only. Quality and variety gates are
//! applied by whoever composes the pipeline.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use puzzleforge_core::{
    parameter_signature, Difficulty, GeneratedPuzzle, GenerationConfig, GenerationError,
    GenerationResult, GenerationSettings, Parameters, PuzzleMetadata, PuzzleSeed, PuzzleType,
    QualityMetrics,
};
use puzzleforge_quality::{schema_for, ParameterTuner};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::algorithm::{Draft, DraftRequest, PuzzleAlgorithm, SolvabilityChecker, Verdict};
use crate::logic::{LogicAlgorithm, LogicChecker};
use crate::math::{MathAlgorithm, MathChecker};
use crate::pattern::{PatternAlgorithm, PatternChecker};
use crate::visual::{VisualAlgorithm, VisualChecker};
use crate::word::{WordAlgorithm, WordChecker};

/// Applies the difficulty factor to raw algorithm metrics.
///
/// Complexity is capped at the factor and clarity is scaled by it. The
/// factor never exceeds 1, so harder puzzles never look clearer.
#[must_use]
pub fn adjust_metrics(metrics: QualityMetrics, difficulty: Difficulty) -> QualityMetrics {
    let factor = difficulty.clarity_factor().min(1.0);
    QualityMetrics {
        complexity: metrics.complexity.min(factor),
        clarity: metrics.clarity * factor,
        ..metrics
    }
    .clamped()
}

/// Mean of complexity, clarity and engagement potential.
#[must_use]
pub fn engagement_score(metrics: &QualityMetrics) -> f64 {
    ((metrics.complexity + metrics.clarity + metrics.engagement_potential) / 3.0).clamp(0.0, 1.0)
}

/// Routes requests to per-type algorithms and verifies their output.
pub struct GenerationDispatcher {
    settings: GenerationSettings,
    tuner: Arc<ParameterTuner>,
    algorithms: BTreeMap<PuzzleType, Arc<dyn PuzzleAlgorithm>>,
    checkers: BTreeMap<PuzzleType, Arc<dyn SolvabilityChecker>>,
}

impl Default for GenerationDispatcher {
    fn default() -> Self {
        Self::new(GenerationSettings::default())
    }
}

impl GenerationDispatcher {
    /// Creates a dispatcher with the built-in algorithms and checkers.
    #[must_use]
    pub fn new(settings: GenerationSettings) -> Self {
        Self::with_tuner(settings, Arc::new(ParameterTuner::new()))
    }

    /// Creates a dispatcher that shares a tuner with its owner.
    #[must_use]
    pub fn with_tuner(settings: GenerationSettings, tuner: Arc<ParameterTuner>) -> Self {
        let algorithms: [Arc<dyn PuzzleAlgorithm>; 5] = [
            Arc::new(LogicAlgorithm),
            Arc::new(PatternAlgorithm),
            Arc::new(MathAlgorithm),
            Arc::new(WordAlgorithm),
            Arc::new(VisualAlgorithm),
        ];
        let checkers: [(PuzzleType, Arc<dyn SolvabilityChecker>); 5] = [
            (PuzzleType::Logic, Arc::new(LogicChecker)),
            (PuzzleType::Pattern, Arc::new(PatternChecker)),
            (PuzzleType::Math, Arc::new(MathChecker)),
            (PuzzleType::Word, Arc::new(WordChecker)),
            (PuzzleType::Visual, Arc::new(VisualChecker)),
        ];
        Self {
            settings,
            tuner,
            algorithms: algorithms.into_iter().map(|a| (a.puzzle_type(), a)).collect(),
            checkers: checkers.into_iter().collect(),
        }
    }

    /// Replaces the algorithm for its puzzle type.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Arc<dyn PuzzleAlgorithm>) -> Self {
        self.algorithms.insert(algorithm.puzzle_type(), algorithm);
        self
    }

    /// Replaces the solvability checker for a puzzle type.
    #[must_use]
    pub fn with_checker(mut self, puzzle_type: PuzzleType, checker: Arc<dyn SolvabilityChecker>) -> Self {
        self.checkers.insert(puzzle_type, checker);
        self
    }

    /// Generation settings.
    #[must_use]
    pub const fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// The tuner used for parameter validation and clamping.
    #[must_use]
    pub const fn tuner(&self) -> &Arc<ParameterTuner> {
        &self.tuner
    }

    /// Total attempts per request.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.settings.max_solvability_retries + 1
    }

    /// Generates from type and difficulty names.
    ///
    /// # Errors
    ///
    /// `UnknownPuzzleType` / `UnknownDifficulty` for unknown names, plus
    /// everything `generate` returns.
    pub fn generate_named(
        &self,
        puzzle_type: &str,
        difficulty: &str,
        parameters: Parameters,
        seed: Option<u64>,
    ) -> GenerationResult<GeneratedPuzzle> {
        let mut config = GenerationConfig::parse(puzzle_type, difficulty)?.with_parameters(parameters);
        config.seed = seed;
        self.generate(&config)
    }

    /// Generates one solvable puzzle.
    ///
    /// # Errors
    ///
    /// - `InvalidParameters` when strict parameters are enabled and the
    ///   parameters fail schema validation
    /// - `GenerationExhausted` when every attempt is unsolvable
    pub fn generate(&self, config: &GenerationConfig) -> GenerationResult<GeneratedPuzzle> {
        let seed = config.seed.map_or_else(PuzzleSeed::draw, PuzzleSeed::new);
        self.generate_seeded(config, seed)
    }

    fn generate_seeded(&self, config: &GenerationConfig, base: PuzzleSeed) -> GenerationResult<GeneratedPuzzle> {
        let puzzle_type = config.puzzle_type;
        let algorithm = self
            .algorithms
            .get(&puzzle_type)
            .ok_or_else(|| GenerationError::UnknownPuzzleType(puzzle_type.to_string()))?;
        let checker = self
            .checkers
            .get(&puzzle_type)
            .ok_or_else(|| GenerationError::UnknownPuzzleType(puzzle_type.to_string()))?;

        if self.settings.strict_parameters {
            let report = self
                .tuner
                .validate_parameters_for(puzzle_type, config.difficulty, &config.parameters);
            if !report.valid {
                return Err(GenerationError::InvalidParameters(report.errors));
            }
        }
        let parameters = self.tuner.clamp_parameters(puzzle_type, &config.parameters);
        let request = DraftRequest::new(config.difficulty, &parameters);

        let attempts = self.max_attempts();
        let mut reason = String::new();
        for attempt in 0..attempts {
            let seed = if attempt == 0 { base } else { base.derive(u64::from(attempt)) };
            let draft = algorithm.draft(&request, &mut seed.rng());

            match checker.check(&draft.content, &draft.solution.answer) {
                Verdict::Solvable => {
                    debug!(
                        puzzle_type = %puzzle_type,
                        difficulty = %config.difficulty,
                        seed = seed.value(),
                        attempt,
                        "puzzle generated"
                    );
                    return Ok(Self::finish(config, &parameters, seed, draft));
                }
                Verdict::Unsolvable(why) => {
                    debug!(
                        puzzle_type = %puzzle_type,
                        seed = seed.value(),
                        attempt,
                        reason = %why,
                        "draft rejected as unsolvable"
                    );
                    reason = why;
                }
            }
        }

        warn!(puzzle_type = %puzzle_type, attempts, reason = %reason, "generation exhausted");
        Err(GenerationError::GenerationExhausted {
            puzzle_type,
            attempts,
            reason,
        })
    }

    fn finish(config: &GenerationConfig, parameters: &Parameters, seed: PuzzleSeed, draft: Draft) -> GeneratedPuzzle {
        let difficulty = config.difficulty;
        let metrics = adjust_metrics(draft.metrics, difficulty);
        let now = Utc::now();

        GeneratedPuzzle {
            id: Uuid::new_v4().to_string(),
            puzzle_type: config.puzzle_type,
            difficulty,
            difficulty_rating: difficulty.rating(),
            title: draft.title,
            description: draft.description,
            content: draft.content,
            solution: draft.solution,
            hints: draft.hints,
            time_limit: difficulty.time_limit_secs(),
            base_points: difficulty.base_points(),
            metadata: PuzzleMetadata {
                generation_method: schema_for(config.puzzle_type).name.to_string(),
                generated_at: now,
                seed: seed.value(),
                parameter_signature: parameter_signature(parameters),
                quality_metrics: metrics,
                solvability_score: draft.solvability_score.clamp(0.0, 1.0),
                engagement_score: engagement_score(&metrics),
            },
            validation_score: draft.validation_score.clamp(0.0, 1.0),
            estimated_solve_time: draft.estimated_solve_time,
            created_at: now,
        }
    }
}
