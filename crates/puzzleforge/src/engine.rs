//! # Puzzle Engine
//!
//! **The full pipeline behind one explicit instance**
//!
//! ```text
//! cache lookup ─hit──────────────────────────────────────────────▶ puzzle
//!      │miss
//!      ▼
//! dispatcher ─▶ quality gate ─▶ variety gate ─▶ track ─▶ cache store ─▶ puzzle
//!                   │reject          │reject
//!                   └──── adjust params, derive seed, retry ────┘
//! ```
//!
//! A quality rejection whose complexity is out of band merges the tuner's
//! "too easy" or "too hard" adjustments into the parameters before the
//! next attempt. Every retry draws from a derived seed, so a seeded
//! request stays reproducible end to end.
//!
//! The cache key stays held from lookup to store, so a second caller with
//! the same request waits and takes the hit path.

use std::sync::Arc;
use std::time::Instant;

use puzzleforge_core::{
    ConfigError, Difficulty, EngineConfig, GeneratedPuzzle, GenerationConfig, GenerationError,
    GenerationResult, Parameters, PuzzleSeed, PuzzleType,
};
use puzzleforge_procedural::GenerationDispatcher;
use puzzleforge_quality::{
    ParameterTuner, QualityAssessor, QualityReport, TuningResult, UniquenessResult, VarietyService,
};
use tracing::{debug, info, warn};

use crate::batch::{run_batch, BatchOutcome, BatchRequest};
use crate::cache::{generate_cache_key, CacheDiagnostics, OptimizeOutcome, PuzzleCache};
use crate::stats::{analyze_bottlenecks, render_performance_report, Bottleneck, PerformanceMonitor, PerformanceStats};

/// Gate retries derive their seeds from this namespace so they never
/// collide with the dispatcher's own solvability retries.
const GATE_SEED_OFFSET: u64 = 1 << 32;

/// Recent admitted puzzles considered by `tune`.
const TUNING_SAMPLE: usize = 50;

/// Generation engine. One per owner; share it behind an `Arc`.
pub struct PuzzleEngine {
    config: EngineConfig,
    dispatcher: GenerationDispatcher,
    assessor: QualityAssessor,
    variety: VarietyService,
    cache: PuzzleCache,
    monitor: PerformanceMonitor,
}

impl Default for PuzzleEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl PuzzleEngine {
    /// Creates an engine from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if any limit is unusable.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let tuner = Arc::new(ParameterTuner::new());
        Self {
            dispatcher: GenerationDispatcher::with_tuner(config.generation.clone(), tuner),
            assessor: QualityAssessor::new(),
            variety: VarietyService::new(config.variety.clone()),
            cache: PuzzleCache::new(config.cache.clone()),
            monitor: PerformanceMonitor::new(config.stats.rolling_window),
            config,
        }
    }

    // =========================================================================
    // GENERATION
    // =========================================================================

    /// Returns a cached puzzle or runs the gated pipeline.
    ///
    /// Identical concurrent requests share one run: the cache holds the
    /// key while the first request generates, and the others receive its
    /// stored puzzle.
    ///
    /// # Errors
    ///
    /// Dispatcher errors propagate unchanged. `GenerationExhausted` when
    /// every gate attempt was rejected.
    pub fn generate(&self, config: &GenerationConfig) -> GenerationResult<GeneratedPuzzle> {
        let key = generate_cache_key(config);
        self.cache.get_or_insert_with(&key, None, || self.run_gates(config))
    }

    fn run_gates(&self, config: &GenerationConfig) -> GenerationResult<GeneratedPuzzle> {
        let base = config.seed.map_or_else(PuzzleSeed::draw, PuzzleSeed::new);
        let attempts = self.config.generation.max_gate_attempts.max(1);
        let mut parameters = config.parameters.clone();
        let mut reason = String::new();

        for attempt in 0..attempts {
            let seed = if attempt == 0 {
                base
            } else {
                base.derive(GATE_SEED_OFFSET + u64::from(attempt))
            };
            let request = GenerationConfig::new(config.puzzle_type, config.difficulty)
                .with_parameters(parameters.clone())
                .with_seed(seed.value());

            let started = Instant::now();
            let puzzle = self.dispatcher.generate(&request)?;
            self.monitor.record_generation(started.elapsed());

            let validation_started = Instant::now();
            let report = self.assessor.assess(&puzzle);
            if !report.passes_standards {
                self.monitor.record_validation(validation_started.elapsed());
                reason = format!("quality gate: {}", report.issues.join("; "));
                warn!(
                    puzzle_type = %config.puzzle_type,
                    difficulty = %config.difficulty,
                    attempt,
                    overall = report.overall_score,
                    "quality gate rejected puzzle"
                );
                self.adjust_after_rejection(config.puzzle_type, &report, &mut parameters);
                continue;
            }

            let uniqueness = self.variety.ensure_uniqueness(&puzzle);
            self.monitor.record_validation(validation_started.elapsed());
            if !uniqueness.is_unique {
                reason = format!(
                    "variety gate: {} similar puzzles, uniqueness {:.2}",
                    uniqueness.similar_puzzles.len(),
                    uniqueness.uniqueness_score
                );
                warn!(
                    puzzle_type = %config.puzzle_type,
                    difficulty = %config.difficulty,
                    attempt,
                    similar = uniqueness.similar_puzzles.len(),
                    "variety gate rejected puzzle"
                );
                continue;
            }

            self.variety.track_variety(&puzzle);
            info!(
                puzzle_id = %puzzle.id,
                puzzle_type = %puzzle.puzzle_type,
                difficulty = %puzzle.difficulty,
                seed = puzzle.metadata.seed,
                attempt,
                "puzzle generated"
            );
            return Ok(puzzle);
        }

        Err(GenerationError::GenerationExhausted {
            puzzle_type: config.puzzle_type,
            attempts,
            reason,
        })
    }

    fn adjust_after_rejection(&self, puzzle_type: PuzzleType, report: &QualityReport, parameters: &mut Parameters) {
        let issue = if report.complexity_too_low() {
            "too easy"
        } else if report.complexity_too_high() {
            "too hard"
        } else {
            return;
        };
        let adjustments = self.tuner().recommend_parameter_adjustments(puzzle_type, issue);
        debug!(issue, adjusted = adjustments.adjustments.len(), "applying parameter adjustments");
        parameters.extend(adjustments.adjustments);
    }

    /// Generates `count` puzzles through the full pipeline.
    ///
    /// Each item gets its own seed derived from one batch seed, so items
    /// never share a cache key. `batch_size` defaults to the configured
    /// group width.
    pub fn batch(
        &self,
        count: usize,
        puzzle_type: PuzzleType,
        difficulty: Difficulty,
        parallel: bool,
        batch_size: Option<usize>,
    ) -> BatchOutcome {
        let request = BatchRequest {
            count,
            puzzle_type,
            difficulty,
            parallel,
            batch_size: batch_size.unwrap_or(self.config.batch.default_batch_size),
        };
        let batch_seed = PuzzleSeed::draw();
        run_batch(&request, |index| {
            let seed = batch_seed.derive(index as u64);
            self.generate(&GenerationConfig::new(puzzle_type, difficulty).with_seed(seed.value()))
        })
    }

    // =========================================================================
    // GATES AND TUNING
    // =========================================================================

    /// Scores a puzzle against the quality thresholds.
    #[must_use]
    pub fn assess(&self, puzzle: &GeneratedPuzzle) -> QualityReport {
        self.assessor.assess(puzzle)
    }

    /// Checks a puzzle against recent history, admitting it if unique.
    #[must_use]
    pub fn ensure_uniqueness(&self, puzzle: &GeneratedPuzzle) -> UniquenessResult {
        self.variety.ensure_uniqueness(puzzle)
    }

    /// Tunes `params` against the puzzles recently admitted for the type.
    #[must_use]
    pub fn tune(&self, puzzle_type: PuzzleType, params: &Parameters) -> TuningResult {
        let recent = self.variety.recent_puzzles(puzzle_type, TUNING_SAMPLE);
        self.tuner().tune_parameters(puzzle_type, params, &recent)
    }

    // =========================================================================
    // MAINTENANCE AND REPORTING
    // =========================================================================

    /// Cache maintenance pass.
    pub fn maintain(&self) -> OptimizeOutcome {
        self.cache.optimize()
    }

    /// Current performance figures.
    #[must_use]
    pub fn performance_stats(&self) -> PerformanceStats {
        self.monitor
            .snapshot(self.cache.hit_rate(), self.cache.len(), self.cache.memory_estimate_mb())
    }

    /// Bottlenecks in the current figures.
    #[must_use]
    pub fn analyze_bottlenecks(&self) -> Vec<Bottleneck> {
        analyze_bottlenecks(&self.performance_stats())
    }

    /// Performance report text.
    #[must_use]
    pub fn performance_report(&self) -> String {
        render_performance_report(&self.performance_stats())
    }

    /// Cache size, utilisation and ages.
    #[must_use]
    pub fn cache_diagnostics(&self) -> CacheDiagnostics {
        self.cache.diagnostics()
    }

    /// Variety report text.
    #[must_use]
    pub fn variety_report(&self) -> String {
        self.variety.variety_report()
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &GenerationDispatcher {
        &self.dispatcher
    }

    /// The parameter tuner shared with the dispatcher.
    #[must_use]
    pub fn tuner(&self) -> &ParameterTuner {
        self.dispatcher.tuner()
    }

    /// The variety tracker.
    #[must_use]
    pub const fn variety(&self) -> &VarietyService {
        &self.variety
    }

    /// The cache.
    #[must_use]
    pub const fn cache(&self) -> &PuzzleCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.cache.capacity = 0;
        assert!(matches!(PuzzleEngine::new(config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_generate_admits_and_caches() {
        let engine = PuzzleEngine::default();
        let config = GenerationConfig::new(PuzzleType::Word, Difficulty::Medium).with_seed(11);
        let puzzle = engine.generate(&config).unwrap();

        assert_eq!(engine.variety().history_len(), 1);
        assert!(engine.cache().contains(&generate_cache_key(&config)));
        assert!(engine.variety().variety_tracker(PuzzleType::Word, Difficulty::Medium).is_some());
        assert_eq!(engine.performance_stats().total_generations, 1);
        assert!(engine.assess(&puzzle).passes_standards);
    }

    #[test]
    fn test_quality_rejection_adjusts_parameters() {
        let engine = PuzzleEngine::default();
        let report = QualityReport {
            overall_score: 0.5,
            metrics_breakdown: puzzleforge_core::QualityMetrics {
                complexity: 0.05,
                uniqueness: 0.9,
                clarity: 0.9,
                solvability: 0.9,
                engagement_potential: 0.9,
            },
            issues: vec!["Complexity too low".to_string()],
            recommendations: Vec::new(),
            passes_standards: false,
        };
        let mut params = Parameters::new();
        engine.adjust_after_rejection(PuzzleType::Math, &report, &mut params);
        assert!(params.contains_key("operationCount"));
    }

    #[test]
    fn test_dispatcher_errors_propagate() {
        let mut config = EngineConfig::default();
        config.generation.strict_parameters = true;
        let engine = PuzzleEngine::new(config).unwrap();
        let request = GenerationConfig::new(PuzzleType::Math, Difficulty::Easy)
            .with_parameter("operationCount", 99.0)
            .with_seed(1);

        assert!(matches!(engine.generate(&request), Err(GenerationError::InvalidParameters(_))));
        assert_eq!(engine.performance_stats().total_generations, 0);
    }
}
