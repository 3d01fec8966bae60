//! # Variety & Uniqueness
//!
//! Sliding-window duplicate detection and per-bucket diversity metrics.
//!
//! ## State
//!
//! - **History**: admitted puzzles, oldest first, capped at `max_history`
//!   and pruned of entries older than the uniqueness window on every
//!   admission.
//! - **Hash set**: content hashes of admitted puzzles (statistics only).
//! - **Trackers**: one ring of recent content hashes per
//!   `(type, difficulty)` bucket, created on first use.
//!
//! All of it sits behind one `parking_lot::Mutex`; every public operation
//! takes the lock exactly once.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use puzzleforge_core::{
    Difficulty, GeneratedPuzzle, ParamValue, Parameters, PuzzleType, VarietySettings,
};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::similarity::{content_hash, puzzle_similarity};

/// Puzzles older than this are no longer fresh.
pub const FRESHNESS_DAYS: i64 = 7;

/// Recent hashes of one `(type, difficulty)` bucket.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VarietyTracker {
    /// Bucket type.
    pub puzzle_type: PuzzleType,
    /// Bucket difficulty.
    pub difficulty: Difficulty,
    /// Most recent content hashes, oldest first.
    pub recent_hashes: VecDeque<String>,
    /// Distinct hashes / total hashes.
    pub uniqueness_score: f64,
    /// Time of the last tracked puzzle.
    pub last_generated: DateTime<Utc>,
}

impl VarietyTracker {
    fn new(puzzle_type: PuzzleType, difficulty: Difficulty, now: DateTime<Utc>) -> Self {
        Self {
            puzzle_type,
            difficulty,
            recent_hashes: VecDeque::new(),
            uniqueness_score: 1.0,
            last_generated: now,
        }
    }

    /// Number of distinct hashes in the ring.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        self.recent_hashes.iter().collect::<HashSet<_>>().len()
    }
}

/// A history entry judged similar to a candidate.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarMatch {
    /// Id of the earlier puzzle.
    pub puzzle_id: String,
    /// Its type.
    pub puzzle_type: PuzzleType,
    /// Its difficulty.
    pub difficulty: Difficulty,
    /// Weighted similarity in `[0, 1]`.
    pub similarity: f64,
}

/// Result of `VarietyService::ensure_uniqueness`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniquenessResult {
    /// No similar matches and score above the minimum.
    pub is_unique: bool,
    /// Similar history entries inside the window.
    pub similar_puzzles: Vec<SimilarMatch>,
    /// `1 - similar / max(1, history size)`.
    pub uniqueness_score: f64,
    /// What to do when rejected.
    pub suggestions: Vec<String>,
}

/// Per-bucket diversity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversityMetrics {
    /// The bucket tracker's uniqueness score.
    pub uniqueness_to_bucket: f64,
    /// Distinct / total hashes in the ring.
    pub diversity_score: f64,
    /// Mean of uniqueness and diversity.
    pub variety_score: f64,
    /// Linear decay to zero over the freshness window.
    pub freshness: f64,
}

impl DiversityMetrics {
    /// Metrics reported for a bucket with no tracker yet.
    pub const UNTRACKED: Self = Self {
        uniqueness_to_bucket: 1.0,
        diversity_score: 0.5,
        variety_score: 0.5,
        freshness: 0.5,
    };
}

/// Aggregate uniqueness over every bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UniquenessStatistics {
    /// Mean tracker uniqueness score.
    pub avg_uniqueness_score: f64,
    /// Number of buckets with a tracker.
    pub bucket_count: usize,
    /// Distinct admitted hashes.
    pub total_unique: usize,
    /// `max(0, 1 - total_unique / history size)`.
    pub duplicate_rate: f64,
}

#[derive(Default)]
struct VarietyState {
    trackers: BTreeMap<(PuzzleType, Difficulty), VarietyTracker>,
    hashes: HashSet<String>,
    history: VecDeque<GeneratedPuzzle>,
}

/// Thread-safe uniqueness and variety tracker.
pub struct VarietyService {
    settings: VarietySettings,
    state: Mutex<VarietyState>,
}

impl Default for VarietyService {
    fn default() -> Self {
        Self::new(VarietySettings::default())
    }
}

impl VarietyService {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new(settings: VarietySettings) -> Self {
        Self {
            settings,
            state: Mutex::new(VarietyState::default()),
        }
    }

    /// The settings in use.
    #[must_use]
    pub const fn settings(&self) -> &VarietySettings {
        &self.settings
    }

    // =========================================================================
    // UNIQUENESS
    // =========================================================================

    /// Checks a puzzle against recent history and admits it if unique.
    #[must_use]
    pub fn ensure_uniqueness(&self, puzzle: &GeneratedPuzzle) -> UniquenessResult {
        self.ensure_uniqueness_at(puzzle, Utc::now())
    }

    /// `ensure_uniqueness` with an explicit clock.
    #[must_use]
    pub fn ensure_uniqueness_at(&self, puzzle: &GeneratedPuzzle, now: DateTime<Utc>) -> UniquenessResult {
        let cutoff = now - Duration::seconds(self.settings.uniqueness_window_secs);
        let mut state = self.state.lock();

        let similar_puzzles: Vec<SimilarMatch> = state
            .history
            .iter()
            .filter(|h| h.created_at >= cutoff)
            .filter_map(|h| {
                let similarity = puzzle_similarity(puzzle, h);
                (similarity >= self.settings.similarity_threshold).then(|| SimilarMatch {
                    puzzle_id: h.id.clone(),
                    puzzle_type: h.puzzle_type,
                    difficulty: h.difficulty,
                    similarity,
                })
            })
            .collect();

        let uniqueness_score =
            1.0 - similar_puzzles.len() as f64 / state.history.len().max(1) as f64;
        let is_unique =
            similar_puzzles.is_empty() && uniqueness_score >= self.settings.min_uniqueness_score;

        let mut suggestions = Vec::new();
        if is_unique {
            state.hashes.insert(content_hash(puzzle));
            state.history.push_back(puzzle.clone());
            self.prune(&mut state, cutoff);
            debug!(
                puzzle_id = %puzzle.id,
                puzzle_type = %puzzle.puzzle_type,
                history = state.history.len(),
                "puzzle admitted to uniqueness history"
            );
        } else {
            if !similar_puzzles.is_empty() {
                suggestions.push(format!(
                    "Found {} similar puzzles - consider regenerating",
                    similar_puzzles.len()
                ));
            }
            if uniqueness_score < self.settings.min_uniqueness_score {
                suggestions.push("Uniqueness score below threshold - try different parameters".to_string());
            }
            debug!(
                puzzle_id = %puzzle.id,
                similar = similar_puzzles.len(),
                uniqueness_score,
                "puzzle rejected as too similar"
            );
        }

        UniquenessResult {
            is_unique,
            similar_puzzles,
            uniqueness_score,
            suggestions,
        }
    }

    fn prune(&self, state: &mut VarietyState, cutoff: DateTime<Utc>) {
        while let Some(front) = state.history.front() {
            let over_cap = state.history.len() > self.settings.max_history;
            if !over_cap && front.created_at >= cutoff {
                break;
            }
            if let Some(evicted) = state.history.pop_front() {
                let hash = content_hash(&evicted);
                if !state.history.iter().any(|p| content_hash(p) == hash) {
                    state.hashes.remove(&hash);
                }
            }
        }
    }

    /// Admitted puzzles of one type, newest first.
    #[must_use]
    pub fn recent_puzzles(&self, puzzle_type: PuzzleType, limit: usize) -> Vec<GeneratedPuzzle> {
        self.state
            .lock()
            .history
            .iter()
            .rev()
            .filter(|p| p.puzzle_type == puzzle_type)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Number of puzzles in the history.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.state.lock().history.len()
    }

    // =========================================================================
    // VARIETY
    // =========================================================================

    /// Records a puzzle's hash in its bucket ring.
    pub fn track_variety(&self, puzzle: &GeneratedPuzzle) {
        self.track_variety_at(puzzle, Utc::now());
    }

    /// `track_variety` with an explicit clock.
    pub fn track_variety_at(&self, puzzle: &GeneratedPuzzle, now: DateTime<Utc>) {
        let hash = content_hash(puzzle);
        let mut state = self.state.lock();
        let tracker = state
            .trackers
            .entry((puzzle.puzzle_type, puzzle.difficulty))
            .or_insert_with(|| VarietyTracker::new(puzzle.puzzle_type, puzzle.difficulty, now));

        tracker.recent_hashes.push_back(hash);
        while tracker.recent_hashes.len() > self.settings.bucket_ring_capacity {
            tracker.recent_hashes.pop_front();
        }
        tracker.uniqueness_score =
            tracker.distinct_count() as f64 / tracker.recent_hashes.len() as f64;
        tracker.last_generated = now;
    }

    /// Snapshot of one bucket's tracker.
    #[must_use]
    pub fn variety_tracker(&self, puzzle_type: PuzzleType, difficulty: Difficulty) -> Option<VarietyTracker> {
        self.state.lock().trackers.get(&(puzzle_type, difficulty)).cloned()
    }

    /// Diversity of one bucket.
    #[must_use]
    pub fn calculate_diversity_metrics(&self, puzzle_type: PuzzleType, difficulty: Difficulty) -> DiversityMetrics {
        self.calculate_diversity_metrics_at(puzzle_type, difficulty, Utc::now())
    }

    /// `calculate_diversity_metrics` with an explicit clock.
    #[must_use]
    pub fn calculate_diversity_metrics_at(
        &self,
        puzzle_type: PuzzleType,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> DiversityMetrics {
        let state = self.state.lock();
        let Some(tracker) = state.trackers.get(&(puzzle_type, difficulty)) else {
            return DiversityMetrics::UNTRACKED;
        };

        let uniqueness_to_bucket = tracker.uniqueness_score;
        let diversity_score =
            tracker.distinct_count() as f64 / tracker.recent_hashes.len().max(1) as f64;
        let elapsed_ms = (now - tracker.last_generated).num_milliseconds().max(0) as f64;
        let window_ms = (self.settings.freshness_window_secs * 1000) as f64;

        DiversityMetrics {
            uniqueness_to_bucket,
            diversity_score,
            variety_score: (uniqueness_to_bucket + diversity_score) / 2.0,
            freshness: (1.0 - elapsed_ms / window_ms).max(0.0),
        }
    }

    /// Per-type counts still needed for an even split of `target`.
    #[must_use]
    pub fn suggest_type_distribution(
        current: &BTreeMap<PuzzleType, usize>,
        target: usize,
    ) -> BTreeMap<PuzzleType, usize> {
        let ideal = target / PuzzleType::ALL.len();
        PuzzleType::ALL
            .into_iter()
            .map(|t| (t, ideal.saturating_sub(current.get(&t).copied().unwrap_or(0))))
            .collect()
    }

    /// True when the puzzle was created within the last seven days.
    #[must_use]
    pub fn is_fresh(puzzle: &GeneratedPuzzle) -> bool {
        Self::is_fresh_at(puzzle, Utc::now())
    }

    /// `is_fresh` with an explicit clock.
    #[must_use]
    pub fn is_fresh_at(puzzle: &GeneratedPuzzle, now: DateTime<Utc>) -> bool {
        now - puzzle.created_at < Duration::days(FRESHNESS_DAYS)
    }

    /// Aggregate statistics over every bucket.
    #[must_use]
    pub fn uniqueness_statistics(&self) -> UniquenessStatistics {
        let state = self.state.lock();
        if state.trackers.is_empty() {
            return UniquenessStatistics::default();
        }

        let total: f64 = state.trackers.values().map(|t| t.uniqueness_score).sum();
        let total_unique = state.hashes.len();
        UniquenessStatistics {
            avg_uniqueness_score: total / state.trackers.len() as f64,
            bucket_count: state.trackers.len(),
            total_unique,
            duplicate_rate: (1.0 - total_unique as f64 / state.history.len().max(1) as f64).max(0.0),
        }
    }

    /// Human-readable variety summary.
    #[must_use]
    pub fn variety_report(&self) -> String {
        let state = self.state.lock();
        let mut report = String::from("=== PUZZLE VARIETY REPORT ===\n\n");

        let _ = writeln!(report, "Total Puzzles Generated: {}", state.history.len());
        let _ = writeln!(report, "Total Unique Puzzles: {}\n", state.hashes.len());
        let _ = writeln!(report, "VARIETY BY TYPE AND DIFFICULTY:");
        for tracker in state.trackers.values() {
            let _ = writeln!(
                report,
                "  {} ({}): {} unique / {} total",
                tracker.puzzle_type,
                tracker.difficulty,
                tracker.distinct_count(),
                tracker.recent_hashes.len()
            );
            let _ = writeln!(report, "    Uniqueness Score: {:.2}", tracker.uniqueness_score);
        }

        let _ = writeln!(report, "\nRECENT GENERATION HISTORY:");
        let skip = state.history.len().saturating_sub(10);
        for puzzle in state.history.iter().skip(skip) {
            let short: String = puzzle.id.chars().take(8).collect();
            let _ = writeln!(report, "  {short}... - {} ({})", puzzle.puzzle_type, puzzle.difficulty);
        }
        report
    }

    /// Forgets all history, hashes and trackers.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.trackers.clear();
        state.hashes.clear();
        state.history.clear();
    }
}

/// Jittered copies of `base` for widening a bucket's variety.
///
/// Returns five variations when `diversity_score < 0.5`, otherwise three.
/// Each numeric value is scaled by an independent factor in `[0.7, 1.3]`;
/// values that were whole numbers stay whole.
#[must_use]
pub fn recommend_parameter_variations<R: Rng + ?Sized>(
    base: &Parameters,
    diversity_score: f64,
    rng: &mut R,
) -> Vec<Parameters> {
    let count = if diversity_score < 0.5 { 5 } else { 3 };
    (0..count)
        .map(|_| {
            base.iter()
                .map(|(name, value)| {
                    let varied = match value {
                        ParamValue::Number(n) => {
                            let scaled = n * rng.gen_range(0.7..=1.3);
                            ParamValue::Number(if n.fract().abs() < f64::EPSILON { scaled.round() } else { scaled })
                        }
                        other => other.clone(),
                    };
                    (name.clone(), varied)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_at, sample_puzzle};
    use puzzleforge_core::PuzzleSeed;

    #[test]
    fn test_second_call_with_same_puzzle_is_rejected() {
        let service = VarietyService::default();
        let puzzle = sample_puzzle("p-1", 5);

        let first = service.ensure_uniqueness(&puzzle);
        assert!(first.is_unique);
        assert!((first.uniqueness_score - 1.0).abs() < f64::EPSILON);

        let second = service.ensure_uniqueness(&puzzle);
        assert!(!second.is_unique);
        assert_eq!(second.similar_puzzles.len(), 1);
        assert!((second.similar_puzzles[0].similarity - 1.0).abs() < 1e-9);
        assert!(second.suggestions[0].starts_with("Found 1 similar"));
        assert_eq!(service.history_len(), 1);
    }

    #[test]
    fn test_other_bucket_is_not_similar() {
        let service = VarietyService::default();
        let now = Utc::now();
        assert!(service.ensure_uniqueness_at(&sample_at("a", 1, Difficulty::Easy, now), now).is_unique);
        assert!(service.ensure_uniqueness_at(&sample_at("b", 2, Difficulty::Hard, now), now).is_unique);
        assert_eq!(service.history_len(), 2);
    }

    #[test]
    fn test_window_excludes_old_history() {
        let service = VarietyService::default();
        let then = Utc::now() - Duration::hours(30);
        let old = sample_at("old", 5, Difficulty::Medium, then);
        assert!(service.ensure_uniqueness_at(&old, then).is_unique);

        let now = then + Duration::hours(30);
        let again = sample_at("new", 5, Difficulty::Medium, now);
        let result = service.ensure_uniqueness_at(&again, now);
        assert!(result.is_unique);
        // the expired entry was pruned on admission
        assert_eq!(service.history_len(), 1);
    }

    #[test]
    fn test_pruned_entry_keeps_hash_of_readmitted_copy() {
        let service = VarietyService::default();
        let then = Utc::now() - Duration::hours(30);
        assert!(service.ensure_uniqueness_at(&sample_at("first", 7, Difficulty::Medium, then), then).is_unique);

        let now = then + Duration::hours(30);
        let copy = sample_at("second", 7, Difficulty::Medium, now);
        assert!(service.ensure_uniqueness_at(&copy, now).is_unique);
        service.track_variety(&copy);

        assert_eq!(service.history_len(), 1);
        assert_eq!(service.uniqueness_statistics().total_unique, 1);
        assert!(service.variety_report().contains("Total Unique Puzzles: 1"));
    }

    #[test]
    fn test_history_capped() {
        let settings = VarietySettings {
            max_history: 3,
            ..VarietySettings::default()
        };
        let service = VarietyService::new(settings);
        let now = Utc::now();
        for (i, t) in PuzzleType::ALL.into_iter().enumerate() {
            let mut p = sample_at(&format!("p{i}"), i as i64 + 10, Difficulty::Medium, now);
            p.puzzle_type = t;
            assert!(service.ensure_uniqueness_at(&p, now).is_unique);
        }
        assert_eq!(service.history_len(), 3);
        assert_eq!(service.recent_puzzles(PuzzleType::Logic, 10).len(), 0);
        assert_eq!(service.recent_puzzles(PuzzleType::Visual, 10).len(), 1);
    }

    #[test]
    fn test_tracker_ring_and_scores() {
        let settings = VarietySettings {
            bucket_ring_capacity: 4,
            ..VarietySettings::default()
        };
        let service = VarietyService::new(settings);
        let puzzle = sample_puzzle("p", 1);
        service.track_variety(&puzzle);
        service.track_variety(&puzzle);

        let tracker = service.variety_tracker(PuzzleType::Math, Difficulty::Medium).unwrap();
        assert_eq!(tracker.recent_hashes.len(), 2);
        assert!((tracker.uniqueness_score - 0.5).abs() < 1e-9);

        for i in 2..8 {
            service.track_variety(&sample_puzzle("p", i));
        }
        let tracker = service.variety_tracker(PuzzleType::Math, Difficulty::Medium).unwrap();
        assert_eq!(tracker.recent_hashes.len(), 4);
        assert!((tracker.uniqueness_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_diversity_metrics_defaults_and_freshness() {
        let service = VarietyService::default();
        assert_eq!(
            service.calculate_diversity_metrics(PuzzleType::Word, Difficulty::Easy),
            DiversityMetrics::UNTRACKED
        );

        let start = Utc::now();
        let puzzle = sample_at("p", 1, Difficulty::Easy, start);
        service.track_variety_at(&puzzle, start);

        let half = service.calculate_diversity_metrics_at(
            PuzzleType::Math,
            Difficulty::Easy,
            start + Duration::minutes(30),
        );
        assert!((half.freshness - 0.5).abs() < 1e-6);
        assert!((half.variety_score - 1.0).abs() < 1e-9);

        let stale = service.calculate_diversity_metrics_at(
            PuzzleType::Math,
            Difficulty::Easy,
            start + Duration::hours(2),
        );
        assert!(stale.freshness.abs() < f64::EPSILON);
    }

    #[test]
    fn test_parameter_variations() {
        let mut base = Parameters::new();
        base.insert("gridSize".into(), ParamValue::Number(10.0));
        base.insert("solvabilityThreshold".into(), ParamValue::Number(0.75));
        base.insert("colorScheme".into(), ParamValue::from("blackwhite"));

        let mut rng = PuzzleSeed::new(3).rng();
        assert_eq!(recommend_parameter_variations(&base, 0.9, &mut rng).len(), 3);

        let low = recommend_parameter_variations(&base, 0.2, &mut rng);
        assert_eq!(low.len(), 5);
        for variation in &low {
            let grid = variation["gridSize"].as_f64().unwrap();
            assert!((7.0..=13.0).contains(&grid));
            assert!(grid.fract().abs() < f64::EPSILON);
            let threshold = variation["solvabilityThreshold"].as_f64().unwrap();
            assert!((0.525..=0.975).contains(&threshold));
            assert_eq!(variation["colorScheme"], base["colorScheme"]);
        }
    }

    #[test]
    fn test_type_distribution() {
        let mut current = BTreeMap::new();
        current.insert(PuzzleType::Logic, 5);
        current.insert(PuzzleType::Math, 1);

        let plan = VarietyService::suggest_type_distribution(&current, 20);
        assert_eq!(plan[&PuzzleType::Logic], 0);
        assert_eq!(plan[&PuzzleType::Math], 3);
        assert_eq!(plan[&PuzzleType::Visual], 4);
    }

    #[test]
    fn test_freshness_and_statistics_and_reset() {
        let now = Utc::now();
        let old = sample_at("old", 1, Difficulty::Easy, now - Duration::days(8));
        assert!(!VarietyService::is_fresh_at(&old, now));
        assert!(VarietyService::is_fresh_at(&sample_puzzle("new", 1), now));

        let service = VarietyService::default();
        assert_eq!(service.uniqueness_statistics(), UniquenessStatistics::default());

        let puzzle = sample_puzzle("abcdefghijk", 2);
        assert!(service.ensure_uniqueness(&puzzle).is_unique);
        service.track_variety(&puzzle);
        let stats = service.uniqueness_statistics();
        assert_eq!(stats.bucket_count, 1);
        assert_eq!(stats.total_unique, 1);
        assert!(stats.duplicate_rate.abs() < f64::EPSILON);

        let report = service.variety_report();
        assert!(report.contains("math (medium): 1 unique / 1 total"));
        assert!(report.contains("abcdefgh..."));

        service.reset();
        assert_eq!(service.history_len(), 0);
        assert!(service.variety_tracker(PuzzleType::Math, Difficulty::Medium).is_none());
    }
}
