//! # Puzzle Similarity
//!
//! Edit-distance similarity and content hashing.
//!
//! Content is compared through a compact per-type rendering (clue text,
//! sequence terms, expression, scrambles, grid rows) rather than raw JSON,
//! so two puzzles of the same bucket are not judged similar just because
//! their JSON shares a long structural prefix.

use puzzleforge_core::{canonical_json, sha256_hex, GeneratedPuzzle, PuzzleContent};
use serde::Serialize;

/// Characters of the content rendering compared by edit distance.
pub const CONTENT_PREFIX_CHARS: usize = 200;

/// Characters of the content rendering folded into the content hash.
pub const SUMMARY_CHARS: usize = 100;

/// Hex chars of the solution digest folded into the content hash.
const SOLUTION_HASH_LEN: usize = 16;

/// Weight of an exact type match.
pub const TYPE_WEIGHT: f64 = 0.40;
/// Weight of an exact difficulty match.
pub const DIFFICULTY_WEIGHT: f64 = 0.20;
/// Weight of content edit-distance similarity.
pub const CONTENT_WEIGHT: f64 = 0.25;
/// Weight of an exact answer match.
pub const ANSWER_WEIGHT: f64 = 0.15;

/// Levenshtein distance over chars, two-row.
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// `1 - levenshtein / max_len`. Two empty strings are identical.
#[must_use]
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Compact text rendering of a content payload.
#[must_use]
pub fn content_text(content: &PuzzleContent) -> String {
    match content {
        PuzzleContent::Logic(c) => c.clue_text.join("; "),
        PuzzleContent::Pattern(c) => c
            .sequence
            .iter()
            .map(|term| term.map_or_else(|| "?".to_string(), |v| v.to_string()))
            .collect::<Vec<_>>()
            .join(","),
        PuzzleContent::Math(c) => c.expression.clone(),
        PuzzleContent::Word(c) => c.scrambles.join(" "),
        PuzzleContent::Visual(c) => c
            .grid
            .iter()
            .map(|row| row.iter().map(|cell| cell.unwrap_or('?')).collect::<String>())
            .collect::<Vec<_>>()
            .join("/"),
    }
}

fn prefix(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}

/// Edit-distance similarity of two payloads over a fixed-length prefix.
#[must_use]
pub fn content_similarity(a: &PuzzleContent, b: &PuzzleContent) -> f64 {
    let a = prefix(&content_text(a), CONTENT_PREFIX_CHARS);
    let b = prefix(&content_text(b), CONTENT_PREFIX_CHARS);
    if a == b {
        return 1.0;
    }
    string_similarity(&a, &b)
}

/// 1.0 when the answers serialize identically, else 0.0.
#[must_use]
pub fn answer_similarity(a: &GeneratedPuzzle, b: &GeneratedPuzzle) -> f64 {
    if a.solution.answer == b.solution.answer {
        1.0
    } else {
        0.0
    }
}

/// Weighted similarity of two puzzles, symmetric, in `[0, 1]`.
#[must_use]
pub fn puzzle_similarity(a: &GeneratedPuzzle, b: &GeneratedPuzzle) -> f64 {
    let mut score = 0.0;
    if a.puzzle_type == b.puzzle_type {
        score += TYPE_WEIGHT;
    }
    if a.difficulty == b.difficulty {
        score += DIFFICULTY_WEIGHT;
    }
    score += content_similarity(&a.content, &b.content) * CONTENT_WEIGHT;
    score += answer_similarity(a, b) * ANSWER_WEIGHT;
    score
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HashInput<'a> {
    #[serde(rename = "type")]
    puzzle_type: &'a str,
    difficulty: &'a str,
    content_summary: String,
    solution_hash: String,
}

/// Stable 64-hex-char digest of type, difficulty, content summary and
/// solution.
#[must_use]
pub fn content_hash(puzzle: &GeneratedPuzzle) -> String {
    let mut solution_hash = sha256_hex(canonical_json(&puzzle.solution));
    solution_hash.truncate(SOLUTION_HASH_LEN);

    let input = HashInput {
        puzzle_type: puzzle.puzzle_type.as_str(),
        difficulty: puzzle.difficulty.as_str(),
        content_summary: prefix(&content_text(&puzzle.content), SUMMARY_CHARS),
        solution_hash,
    };
    sha256_hex(canonical_json(&input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_puzzle;
    use puzzleforge_core::{Difficulty, PuzzleType};

    #[test]
    fn test_levenshtein_known_values() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn test_string_similarity_bounds() {
        assert!((string_similarity("", "") - 1.0).abs() < f64::EPSILON);
        assert!(string_similarity("abc", "xyz").abs() < f64::EPSILON);
        assert!((string_similarity("abcd", "abce") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_identical_puzzles_fully_similar() {
        let a = sample_puzzle("a", 1);
        assert!((puzzle_similarity(&a, &a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = sample_puzzle("a", 1);
        let mut b = sample_puzzle("b", 977);
        b.difficulty = Difficulty::Hard;
        let ab = puzzle_similarity(&a, &b);
        let ba = puzzle_similarity(&b, &a);
        assert!((ab - ba).abs() < 1e-12);
        assert!(ab < 1.0);
    }

    #[test]
    fn test_type_mismatch_caps_similarity() {
        let a = sample_puzzle("a", 1);
        let mut b = a.clone();
        b.puzzle_type = PuzzleType::Logic;
        assert!((puzzle_similarity(&a, &b) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_content_hash_stable_and_distinct() {
        let a = sample_puzzle("a", 1);
        let mut renamed = a.clone();
        renamed.id = "other".to_string();
        assert_eq!(content_hash(&a), content_hash(&renamed));
        assert_eq!(content_hash(&a).len(), 64);

        let b = sample_puzzle("b", 2);
        assert_ne!(content_hash(&a), content_hash(&b));
    }
}
