//! # Engine Constant Tables
//!
//! Fixed lookup tables indexed by difficulty (easy, medium, hard, expert).
//!
//! **CRITICAL:** These values are part of the artifact format. Two engines
//! with different tables produce incompatible puzzles for the same seed.

/// Difficulty rating on the 1-10 scale.
pub const DIFFICULTY_RATINGS: [u8; 4] = [2, 5, 7, 9];

/// Time limit in seconds.
pub const TIME_LIMITS_SECS: [u32; 4] = [180, 300, 600, 900];

/// Base points awarded for a solve.
pub const BASE_POINTS: [u32; 4] = [50, 100, 250, 500];

/// Clarity multiplier. Never above 1.0: harder puzzles can only read as
/// clear or less clear, never clearer.
pub const CLARITY_FACTORS: [f64; 4] = [1.0, 0.95, 0.90, 0.85];

/// Multiplier applied to numeric parameter defaults by difficulty tuning.
pub const TUNING_MULTIPLIERS: [f64; 4] = [0.6, 1.0, 1.5, 2.0];

// =============================================================================
// PER-TYPE SIZING
// =============================================================================

/// Logic: number of variables (and values, and grid side).
pub const LOGIC_VARIABLES: [usize; 4] = [3, 4, 5, 6];

/// Logic: minimum number of clues.
pub const LOGIC_CONSTRAINTS: [usize; 4] = [3, 5, 8, 12];

/// Pattern: sequence length.
pub const PATTERN_LENGTHS: [usize; 4] = [5, 7, 10, 15];

/// Pattern: complexity level, which unlocks rule families.
pub const PATTERN_LEVELS: [usize; 4] = [1, 2, 3, 4];

/// Pattern: fraction of terms revealed.
pub const PATTERN_REVEAL_RATIOS: [f64; 4] = [0.7, 0.6, 0.5, 0.4];

/// Math: number of operators.
pub const MATH_OPERATIONS: [usize; 4] = [1, 2, 3, 4];

/// Math: operands are drawn from `1..=range`.
pub const MATH_NUMBER_RANGES: [i64; 4] = [10, 100, 1_000, 10_000];

/// Word: number of words.
pub const WORD_COUNTS: [usize; 4] = [4, 6, 8, 12];

/// Word: target word length.
pub const WORD_LENGTHS: [usize; 4] = [5, 7, 9, 11];

/// Visual: grid side length.
pub const VISUAL_GRID_SIZES: [usize; 4] = [3, 4, 5, 6];

/// Visual: pattern complexity level.
pub const VISUAL_COMPLEXITIES: [usize; 4] = [2, 3, 4, 5];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clarity_factor_never_exceeds_one() {
        assert!(CLARITY_FACTORS.iter().all(|f| *f <= 1.0));
        assert!(CLARITY_FACTORS.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_tables_are_monotonic() {
        assert!(DIFFICULTY_RATINGS.windows(2).all(|w| w[0] < w[1]));
        assert!(TIME_LIMITS_SECS.windows(2).all(|w| w[0] < w[1]));
        assert!(BASE_POINTS.windows(2).all(|w| w[0] < w[1]));
        assert!(LOGIC_CONSTRAINTS.windows(2).all(|w| w[0] < w[1]));
        assert!(PATTERN_REVEAL_RATIOS.windows(2).all(|w| w[1] < w[0]));
    }
}
