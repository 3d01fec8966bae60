//! # Visual Grids
//!
//! Symbol grids built from a symmetry rule. A rule partitions the cells
//! into orbits that must all show the same symbol; a missing cell is only
//! ever placed where another member of its orbit stays visible.
//!
//! | Complexity | Unlocks |
//! |------------|---------|
//! | 1 | Mirror (left/right) |
//! | 3 | Cyclic shift (each row is the previous row rotated) |
//! | 4 | Transpose (symmetric about the diagonal) |

use std::collections::BTreeMap;

use puzzleforge_core::{
    tables, Answer, CellAnswer, PuzzleContent, PuzzleType, QualityMetrics, Solution, VisualContent,
};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::algorithm::{wrong_kind, Draft, DraftRequest, PuzzleAlgorithm, SolvabilityChecker, Verdict};

const SHIFT_UNLOCK: usize = 3;
const TRANSPOSE_UNLOCK: usize = 4;

/// Symbols for a colour scheme, falling back to black and white.
#[must_use]
pub fn palette(scheme: &str) -> Vec<char> {
    match scheme.to_ascii_lowercase().as_str() {
        "shapes" => vec!['●', '○', '▲', '△', '■', '□'],
        "letters" => vec!['A', 'B', 'C', 'D', 'E', 'F'],
        _ => vec!['●', '○'],
    }
}

/// A symmetry that ties cells together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridRule {
    /// Row reads the same forwards and backwards.
    Mirror,
    /// Row `r` is row 0 rotated right by `r * step`.
    CyclicShift {
        /// Rotation per row.
        step: usize,
    },
    /// Cell `(r, c)` equals cell `(c, r)`.
    Transpose,
}

impl GridRule {
    /// Identifier of the orbit containing `(row, col)`.
    #[must_use]
    pub fn orbit(self, row: usize, col: usize, size: usize) -> usize {
        match self {
            Self::Mirror => row * size + col.min(size - 1 - col),
            Self::CyclicShift { step } => (col + size * size - (row * step) % size) % size,
            Self::Transpose => row.min(col) * size + row.max(col),
        }
    }

    /// Every rule a solver would consider at a complexity.
    #[must_use]
    pub fn candidates(complexity: usize, size: usize) -> Vec<Self> {
        let mut rules = vec![Self::Mirror];
        if complexity >= SHIFT_UNLOCK {
            rules.extend((1..size).map(|step| Self::CyclicShift { step }));
        }
        if complexity >= TRANSPOSE_UNLOCK {
            rules.push(Self::Transpose);
        }
        rules
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::Mirror => "Each row is a mirror image of itself",
            Self::CyclicShift { .. } => "Each row is the row above shifted sideways",
            Self::Transpose => "The grid is symmetric about its main diagonal",
        }
    }
}

/// Symmetry grid generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct VisualAlgorithm;

impl PuzzleAlgorithm for VisualAlgorithm {
    fn puzzle_type(&self) -> PuzzleType {
        PuzzleType::Visual
    }

    fn draft(&self, request: &DraftRequest<'_>, rng: &mut ChaCha8Rng) -> Draft {
        let difficulty = request.difficulty;
        let size = request
            .size("gridSize", difficulty.pick(tables::VISUAL_GRID_SIZES))
            .clamp(3, 6);
        let complexity = request
            .size("complexity", difficulty.pick(tables::VISUAL_COMPLEXITIES))
            .clamp(1, 5);
        let symbols = palette(request.text("colorScheme").unwrap_or("blackwhite"));

        let rules = GridRule::candidates(complexity, size);
        let rule = rules[rng.gen_range(0..rules.len())];

        let mut orbit_symbols: BTreeMap<usize, char> = BTreeMap::new();
        let full: Vec<Vec<char>> = (0..size)
            .map(|r| {
                (0..size)
                    .map(|c| {
                        *orbit_symbols
                            .entry(rule.orbit(r, c, size))
                            .or_insert_with(|| symbols[rng.gen_range(0..symbols.len())])
                    })
                    .collect()
            })
            .collect();

        let mut orbit_sizes: BTreeMap<usize, usize> = BTreeMap::new();
        for r in 0..size {
            for c in 0..size {
                *orbit_sizes.entry(rule.orbit(r, c, size)).or_default() += 1;
            }
        }

        let missing = complexity.saturating_sub(1).max(1);
        let mut cells: Vec<(usize, usize)> = (0..size).flat_map(|r| (0..size).map(move |c| (r, c))).collect();
        cells.shuffle(rng);
        let mut hidden: Vec<(usize, usize)> = Vec::new();
        for (r, c) in cells {
            if hidden.len() == missing {
                break;
            }
            let key = rule.orbit(r, c, size);
            let already = hidden.iter().filter(|(hr, hc)| rule.orbit(*hr, *hc, size) == key).count();
            if orbit_sizes[&key] > already + 1 {
                hidden.push((r, c));
            }
        }
        hidden.sort_unstable();

        let grid: Vec<Vec<Option<char>>> = full
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, s)| (!hidden.contains(&(r, c))).then_some(*s))
                    .collect()
            })
            .collect();
        let answer: Vec<CellAnswer> = hidden
            .iter()
            .map(|&(row, col)| CellAnswer {
                row,
                col,
                symbol: full[row][col],
            })
            .collect();

        let steps = answer
            .iter()
            .map(|a| format!("Row {}, column {} is {}", a.row + 1, a.col + 1, a.symbol))
            .collect();

        Draft {
            title: "Visual Pattern".to_string(),
            description: format!("Fill the {} missing cells of the {size}x{size} grid.", answer.len()),
            content: PuzzleContent::Visual(VisualContent {
                grid,
                palette: symbols,
                grid_size: size,
                complexity,
            }),
            solution: Solution {
                answer: Answer::Cells(answer),
                explanation: rule.describe().to_string(),
                steps,
            },
            hints: vec![
                "Look for symmetry in the grid".to_string(),
                "Compare rows with each other".to_string(),
                rule.describe().to_string(),
            ],
            metrics: QualityMetrics {
                complexity: (complexity as f64 / 5.0).min(1.0),
                uniqueness: rng.gen_range(0.5..1.0),
                clarity: 0.84,
                solvability: 0.9,
                engagement_potential: 0.95,
            },
            solvability_score: 0.9,
            validation_score: 0.83,
            estimated_solve_time: 120 + 50 * complexity as u32,
        }
    }
}

// =============================================================================
// CHECKER
// =============================================================================

/// Hidden cells predicted by `rule`, or `None` if the rule does not fit the
/// visible cells or leaves a hidden cell open.
fn predict(rule: GridRule, content: &VisualContent, hidden: &[(usize, usize)]) -> Option<Vec<char>> {
    let size = content.grid_size;
    let mut seen: BTreeMap<usize, char> = BTreeMap::new();
    for (r, row) in content.grid.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if let Some(symbol) = cell {
                match seen.insert(rule.orbit(r, c, size), *symbol) {
                    Some(previous) if previous != *symbol => return None,
                    _ => {}
                }
            }
        }
    }
    hidden
        .iter()
        .map(|&(r, c)| seen.get(&rule.orbit(r, c, size)).copied())
        .collect()
}

/// Tries every symmetry a solver could consider.
#[derive(Debug, Default, Clone, Copy)]
pub struct VisualChecker;

impl SolvabilityChecker for VisualChecker {
    fn check(&self, content: &PuzzleContent, answer: &Answer) -> Verdict {
        let PuzzleContent::Visual(content) = content else {
            return wrong_kind(PuzzleType::Visual);
        };
        let Answer::Cells(cells) = answer else {
            return Verdict::Unsolvable("answer is not a list of cells".to_string());
        };
        let size = content.grid_size;
        if size == 0 || content.grid.len() != size || content.grid.iter().any(|row| row.len() != size) {
            return Verdict::Unsolvable("grid is not square".to_string());
        }

        let hidden: Vec<(usize, usize)> = content
            .grid
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().filter(|(_, c)| c.is_none()).map(move |(c, _)| (r, c)))
            .collect();
        let stated: Vec<(usize, usize)> = cells.iter().map(|a| (a.row, a.col)).collect();
        if hidden.is_empty() || hidden != stated {
            return Verdict::Unsolvable("answer does not cover the missing cells".to_string());
        }

        let mut predictions = Vec::new();
        for rule in GridRule::candidates(content.complexity, size) {
            match predict(rule, content, &hidden) {
                Some(p) => predictions.push(p),
                None if fits(rule, content) => {
                    return Verdict::Unsolvable(format!("{rule:?} fits but leaves cells open"));
                }
                None => {}
            }
        }
        if predictions.is_empty() {
            return Verdict::Unsolvable("no symmetry fits the grid".to_string());
        }
        if predictions.windows(2).any(|w| w[0] != w[1]) {
            return Verdict::Unsolvable("several symmetries fit with different cells".to_string());
        }
        if predictions[0].iter().zip(cells).all(|(p, a)| *p == a.symbol) {
            Verdict::Solvable
        } else {
            Verdict::Unsolvable("symmetry disagrees with the stated answer".to_string())
        }
    }
}

/// True when the visible cells are consistent with `rule`.
fn fits(rule: GridRule, content: &VisualContent) -> bool {
    predict(rule, content, &[]).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzleforge_core::{Difficulty, ParamValue, Parameters, PuzzleSeed};

    fn grid(rows: &[&str]) -> Vec<Vec<Option<char>>> {
        rows.iter()
            .map(|row| row.chars().map(|c| (c != '?').then_some(c)).collect())
            .collect()
    }

    fn content(rows: &[&str], complexity: usize) -> PuzzleContent {
        PuzzleContent::Visual(VisualContent {
            grid: grid(rows),
            palette: vec!['A', 'B'],
            grid_size: rows.len(),
            complexity,
        })
    }

    #[test]
    fn test_orbits() {
        assert_eq!(GridRule::Mirror.orbit(1, 0, 3), GridRule::Mirror.orbit(1, 2, 3));
        assert_eq!(GridRule::Transpose.orbit(0, 2, 4), GridRule::Transpose.orbit(2, 0, 4));
        let shift = GridRule::CyclicShift { step: 1 };
        assert_eq!(shift.orbit(0, 0, 4), shift.orbit(1, 1, 4));
        assert_eq!(shift.orbit(0, 3, 4), shift.orbit(1, 0, 4));
    }

    #[test]
    fn test_mirror_grid_solvable() {
        let c = content(&["ABA", "B?B", "AA?"], 2);
        let answer = Answer::Cells(vec![
            CellAnswer { row: 1, col: 1, symbol: 'A' },
            CellAnswer { row: 2, col: 2, symbol: 'A' },
        ]);
        // the centre column has no partner, so (1, 1) stays open
        assert!(!VisualChecker.check(&c, &answer).is_solvable());

        let c = content(&["ABA", "B?B", "?AA"], 2);
        let answer = Answer::Cells(vec![CellAnswer { row: 1, col: 1, symbol: 'A' }, CellAnswer { row: 2, col: 0, symbol: 'A' }]);
        assert!(!VisualChecker.check(&c, &answer).is_solvable());

        let c = content(&["ABA", "BAB", "?AA"], 2);
        let answer = Answer::Cells(vec![CellAnswer { row: 2, col: 0, symbol: 'A' }]);
        assert!(VisualChecker.check(&c, &answer).is_solvable());
        let wrong = Answer::Cells(vec![CellAnswer { row: 2, col: 0, symbol: 'B' }]);
        assert!(!VisualChecker.check(&c, &wrong).is_solvable());
    }

    #[test]
    fn test_palette_schemes() {
        assert_eq!(palette("blackwhite"), vec!['●', '○']);
        assert_eq!(palette("Letters").len(), 6);
        assert_eq!(palette("neon"), vec!['●', '○']);
    }

    #[test]
    fn test_hidden_cells_keep_a_visible_partner() {
        let mut params = Parameters::new();
        params.insert("colorScheme".into(), ParamValue::from("letters"));
        for difficulty in Difficulty::ALL {
            for seed in 0..10 {
                let draft = VisualAlgorithm.draft(&DraftRequest::new(difficulty, &params), &mut PuzzleSeed::new(seed).rng());
                let PuzzleContent::Visual(c) = &draft.content else {
                    panic!("not a visual puzzle");
                };
                let missing = c.grid.iter().flatten().filter(|cell| cell.is_none()).count();
                assert_eq!(missing, c.complexity - 1, "{difficulty}/{seed}");
                assert!(c.grid.iter().flatten().flatten().all(|s| c.palette.contains(s)));
            }
        }
    }

    #[test]
    fn test_easy_drafts_are_solvable() {
        let params = Parameters::new();
        for seed in 0..20 {
            let draft = VisualAlgorithm.draft(&DraftRequest::new(Difficulty::Easy, &params), &mut PuzzleSeed::new(seed).rng());
            let verdict = VisualChecker.check(&draft.content, &draft.solution.answer);
            assert!(verdict.is_solvable(), "{seed}: {verdict:?}");
        }
    }
}
