//! Integration tests for the quality and variety gates.

use std::sync::Arc;
use std::thread;

use chrono::Utc;
use puzzleforge_core::{
    Answer, Difficulty, GeneratedPuzzle, PuzzleContent, PuzzleMetadata, PuzzleType,
    QualityMetrics, Solution, WordContent,
};
use puzzleforge_quality::{ParameterTuner, QualityAssessor, VarietyService};

fn word_puzzle(id: &str, words: &[&str], difficulty: Difficulty) -> GeneratedPuzzle {
    let now = Utc::now();
    let scrambles = words.iter().map(|w| w.chars().rev().collect()).collect();
    GeneratedPuzzle {
        id: id.to_string(),
        puzzle_type: PuzzleType::Word,
        difficulty,
        difficulty_rating: difficulty.rating(),
        title: "Word Scramble".to_string(),
        description: "Unscramble every word".to_string(),
        content: PuzzleContent::Word(WordContent {
            scrambles,
            clues: words.iter().map(|w| format!("{} letters", w.len())).collect(),
            theme: "general".to_string(),
            word_count: words.len(),
        }),
        solution: Solution {
            answer: Answer::Words(words.iter().map(|w| (*w).to_string()).collect()),
            explanation: "Each scramble is its word reversed".to_string(),
            steps: vec!["Read each scramble backwards".to_string()],
        },
        hints: vec!["Try reading right to left".to_string()],
        time_limit: difficulty.time_limit_secs(),
        base_points: difficulty.base_points(),
        metadata: PuzzleMetadata {
            generation_method: "WordPuzzleAlgorithm".to_string(),
            generated_at: now,
            seed: 7,
            parameter_signature: "abcdabcdabcdabcd".to_string(),
            quality_metrics: QualityMetrics {
                complexity: 0.57,
                uniqueness: 0.8,
                clarity: 0.85,
                solvability: 0.9,
                engagement_potential: 0.9,
            },
            solvability_score: 0.9,
            engagement_score: 0.77,
        },
        validation_score: 0.85,
        estimated_solve_time: 300,
        created_at: now,
    }
}

/// Test: a well-formed puzzle passes every validation step.
#[test]
fn test_well_formed_puzzle_passes_pipeline() {
    let puzzle = word_puzzle("w-1", &["PLANET", "GARDEN", "BRIDGE"], Difficulty::Medium);
    let result = QualityAssessor::new().perform_comprehensive_validation(&puzzle);

    assert!(result.passed, "{}", result.report);
    assert_eq!(result.steps.len(), 6);
    assert!(result.report.contains("Structure Validation"));
}

/// Test: concurrent submissions of the same puzzle admit exactly one.
#[test]
fn test_concurrent_duplicates_admit_once() {
    let service = Arc::new(VarietyService::default());
    let puzzle = Arc::new(word_puzzle("dup", &["SILVER", "CASTLE"], Difficulty::Hard));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            let puzzle = Arc::clone(&puzzle);
            thread::spawn(move || service.ensure_uniqueness(&puzzle).is_unique)
        })
        .collect();

    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|unique| *unique)
        .count();

    assert_eq!(admitted, 1);
    assert_eq!(service.history_len(), 1);
}

/// Test: different buckets never collide even with identical content.
#[test]
fn test_buckets_are_independent() {
    let service = VarietyService::default();
    for (i, difficulty) in Difficulty::ALL.into_iter().enumerate() {
        let words: &[&str] = match i {
            0 => &["ORANGE"],
            1 => &["PYTHON"],
            2 => &["MARBLE"],
            _ => &["TUNDRA"],
        };
        let result = service.ensure_uniqueness(&word_puzzle(&format!("b{i}"), words, difficulty));
        assert!(result.is_unique, "{difficulty}: {:?}", result.suggestions);
        service.track_variety(&word_puzzle(&format!("b{i}"), words, difficulty));
    }

    assert_eq!(service.uniqueness_statistics().bucket_count, 4);
    assert_eq!(service.history_len(), 4);
}

/// Test: tuning over admitted history records a run.
#[test]
fn test_tuning_over_recent_puzzles() {
    let service = VarietyService::default();
    let puzzle = word_puzzle("t-1", &["SUNSET"], Difficulty::Easy);
    assert!(service.ensure_uniqueness(&puzzle).is_unique);

    let tuner = ParameterTuner::new();
    let recent = service.recent_puzzles(PuzzleType::Word, 50);
    let result = tuner.tune_parameters(PuzzleType::Word, &tuner.optimize_for_difficulty(PuzzleType::Word, Difficulty::Easy), &recent);

    let expected = puzzle.metrics().mean_quality();
    assert!((result.metrics.original_quality - expected).abs() < 1e-9);
    assert!(result.improvement_score >= 0.0);
    assert_eq!(tuner.optimization_history(5).len(), 1);
}
