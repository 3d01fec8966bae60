//! # Dispatcher Tests
//!
//! End-to-end generation through the dispatcher: determinism, metric
//! ranges, name parsing and independent re-verification.

use std::thread;

use puzzleforge_core::{
    Difficulty, GeneratedPuzzle, GenerationConfig, GenerationError, Parameters, PuzzleContent, PuzzleType,
};
use puzzleforge_procedural::{
    GenerationDispatcher, LogicChecker, MathChecker, PatternChecker, SolvabilityChecker, VisualChecker,
    WordChecker,
};
use puzzleforge_quality::schema_for;

fn checker_for(puzzle_type: PuzzleType) -> Box<dyn SolvabilityChecker> {
    match puzzle_type {
        PuzzleType::Logic => Box::new(LogicChecker),
        PuzzleType::Pattern => Box::new(PatternChecker),
        PuzzleType::Math => Box::new(MathChecker),
        PuzzleType::Word => Box::new(WordChecker),
        PuzzleType::Visual => Box::new(VisualChecker),
    }
}

fn generate(dispatcher: &GenerationDispatcher, puzzle_type: PuzzleType, difficulty: Difficulty, seed: u64) -> GeneratedPuzzle {
    dispatcher
        .generate(&GenerationConfig::new(puzzle_type, difficulty).with_seed(seed))
        .unwrap_or_else(|e| panic!("{puzzle_type}/{difficulty}/{seed}: {e}"))
}

/// Test: the same seed yields the same expression and answer.
#[test]
fn test_math_easy_seed_42_is_reproducible() {
    let dispatcher = GenerationDispatcher::default();
    let a = generate(&dispatcher, PuzzleType::Math, Difficulty::Easy, 42);
    let b = generate(&dispatcher, PuzzleType::Math, Difficulty::Easy, 42);

    let (PuzzleContent::Math(ca), PuzzleContent::Math(cb)) = (&a.content, &b.content) else {
        panic!("expected math content");
    };
    assert_eq!(ca.expression, cb.expression);
    assert_eq!(a.solution.answer, b.solution.answer);
    assert_eq!(a.metadata.seed, b.metadata.seed);
    assert_ne!(a.id, b.id);
}

/// Test: every type and difficulty yields a complete, verified artifact.
#[test]
fn test_every_bucket_generates_verified_puzzles() {
    let dispatcher = GenerationDispatcher::default();

    for puzzle_type in PuzzleType::ALL {
        let checker = checker_for(puzzle_type);
        for difficulty in Difficulty::ALL {
            for seed in 0..3 {
                let puzzle = generate(&dispatcher, puzzle_type, difficulty, seed);

                assert_eq!(puzzle.puzzle_type, puzzle_type);
                assert_eq!(puzzle.difficulty_rating, difficulty.rating());
                assert_eq!(puzzle.time_limit, difficulty.time_limit_secs());
                assert_eq!(puzzle.base_points, difficulty.base_points());
                assert!(puzzle.metrics().is_in_range());
                assert!((0.0..=1.0).contains(&puzzle.metadata.engagement_score));
                assert!((0.0..=1.0).contains(&puzzle.metadata.solvability_score));
                assert!((0.0..=1.0).contains(&puzzle.validation_score));
                assert!(!puzzle.title.is_empty());
                assert!(!puzzle.hints.is_empty());
                assert!(!puzzle.content.is_empty());
                assert_eq!(puzzle.metadata.generation_method, schema_for(puzzle_type).name);
                assert!(
                    checker.check(&puzzle.content, &puzzle.solution.answer).is_solvable(),
                    "{puzzle_type}/{difficulty}/{seed}"
                );
            }
        }
    }
}

/// Test: unknown names are caller errors.
#[test]
fn test_unknown_names_are_rejected() {
    let dispatcher = GenerationDispatcher::default();

    assert_eq!(
        dispatcher.generate_named("chess", "easy", Parameters::new(), Some(1)).map(|p| p.id),
        Err(GenerationError::UnknownPuzzleType("chess".to_string()))
    );
    assert!(matches!(
        dispatcher.generate_named("math", "impossible", Parameters::new(), Some(1)),
        Err(GenerationError::UnknownDifficulty(_))
    ));
    assert!(dispatcher.generate_named("Word", "HARD", Parameters::new(), Some(1)).is_ok());
}

/// Test: generation on many threads matches sequential generation.
#[test]
fn test_concurrent_generation_is_independent() {
    let dispatcher = GenerationDispatcher::default();
    let sequential: Vec<_> = (0..8)
        .map(|seed| generate(&dispatcher, PuzzleType::Pattern, Difficulty::Hard, seed).content)
        .collect();

    let concurrent: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|seed| {
                let dispatcher = &dispatcher;
                scope.spawn(move || generate(dispatcher, PuzzleType::Pattern, Difficulty::Hard, seed).content)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}

/// Test: unseeded requests record the seed they drew.
#[test]
fn test_unseeded_request_records_seed() {
    let dispatcher = GenerationDispatcher::default();
    let puzzle = dispatcher
        .generate(&GenerationConfig::new(PuzzleType::Word, Difficulty::Medium))
        .unwrap();
    let replay = generate(&dispatcher, PuzzleType::Word, Difficulty::Medium, puzzle.metadata.seed);

    assert_eq!(puzzle.content, replay.content);
}

/// Test: artifacts serialize with the documented field names.
#[test]
fn test_puzzle_json_shape() {
    let dispatcher = GenerationDispatcher::default();
    let puzzle = generate(&dispatcher, PuzzleType::Logic, Difficulty::Medium, 9);
    let json = serde_json::to_value(&puzzle).unwrap();

    assert_eq!(json["type"], "logic");
    assert_eq!(json["difficultyRating"], 5);
    assert_eq!(json["content"]["kind"], "logic");
    assert_eq!(json["metadata"]["parameterSignature"].as_str().map(str::len), Some(16));
    assert!(json["metadata"]["qualityMetrics"]["engagementPotential"].is_number());

    let back: GeneratedPuzzle = serde_json::from_value(json).unwrap();
    assert_eq!(back.id, puzzle.id);
    assert_eq!(back.content, puzzle.content);
    assert_eq!(back.solution, puzzle.solution);
}
