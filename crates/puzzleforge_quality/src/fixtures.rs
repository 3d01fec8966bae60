//! Hand-built puzzles for unit tests.

use chrono::{DateTime, Utc};
use puzzleforge_core::{
    Answer, Difficulty, GeneratedPuzzle, MathContent, PuzzleContent, PuzzleMetadata, PuzzleType,
    QualityMetrics, Solution,
};

/// A passing medium math puzzle whose expression and answer depend on
/// `variant`.
pub fn sample_puzzle(id: &str, variant: i64) -> GeneratedPuzzle {
    sample_at(id, variant, Difficulty::Medium, Utc::now())
}

/// Like `sample_puzzle` with an explicit difficulty and creation time.
pub fn sample_at(id: &str, variant: i64, difficulty: Difficulty, created_at: DateTime<Utc>) -> GeneratedPuzzle {
    let left = variant;
    let right = variant * 3 + 1;

    GeneratedPuzzle {
        id: id.to_string(),
        puzzle_type: PuzzleType::Math,
        difficulty,
        difficulty_rating: difficulty.rating(),
        title: "Math Challenge".to_string(),
        description: "Evaluate the expression".to_string(),
        content: PuzzleContent::Math(MathContent {
            expression: format!("{left} + {right}"),
            operation_count: 1,
            number_range: 100,
        }),
        solution: Solution {
            answer: Answer::Number(left + right),
            explanation: format!("{left} + {right} = {}", left + right),
            steps: vec![format!("{left} + {right} = {}", left + right)],
        },
        hints: vec!["Add the two numbers".to_string()],
        time_limit: difficulty.time_limit_secs(),
        base_points: difficulty.base_points(),
        metadata: PuzzleMetadata {
            generation_method: "MathExpressionAlgorithm".to_string(),
            generated_at: created_at,
            seed: 42,
            parameter_signature: "0000000000000000".to_string(),
            quality_metrics: QualityMetrics {
                complexity: 0.6,
                uniqueness: 0.7,
                clarity: 0.9,
                solvability: 1.0,
                engagement_potential: 0.8,
            },
            solvability_score: 1.0,
            engagement_score: 0.77,
        },
        validation_score: 0.92,
        estimated_solve_time: 90,
        created_at,
    }
}
