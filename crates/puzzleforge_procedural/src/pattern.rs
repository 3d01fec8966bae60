//! # Sequence Patterns
//!
//! Integer sequences with hidden terms.
//!
//! ## Rule Families
//!
//! | Level | Unlocks | Rule |
//! |-------|---------|------|
//! | 1 | Arithmetic | `a + i*d` |
//! | 2 | Geometric | `a * r^i` |
//! | 3 | Fibonacci | each term is the sum of the previous two |
//! | 4 | Alternating | two interleaved arithmetic sequences |
//!
//! The checker refits every family to the revealed terms. A puzzle is
//! solvable only when every fitting family predicts the same hidden terms.

use puzzleforge_core::{
    tables, Answer, PatternContent, PuzzleContent, PuzzleType, QualityMetrics, Solution,
};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::algorithm::{wrong_kind, Draft, DraftRequest, PuzzleAlgorithm, SolvabilityChecker, Verdict};

const MIN_LENGTH: usize = 5;
const MAX_LENGTH: usize = 20;

/// Ratios tried when fitting a geometric rule.
const FIT_RATIOS: std::ops::RangeInclusive<i64> = 2..=5;

/// A sequence rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFamily {
    /// Constant difference.
    Arithmetic,
    /// Constant ratio.
    Geometric,
    /// Sum of the previous two.
    Fibonacci,
    /// Even and odd positions each arithmetic.
    Alternating,
}

impl PatternFamily {
    /// Every family, in unlock order.
    pub const ALL: [Self; 4] = [Self::Arithmetic, Self::Geometric, Self::Fibonacci, Self::Alternating];

    /// Lowercase name accepted in `patternTypes`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Arithmetic => "arithmetic",
            Self::Geometric => "geometric",
            Self::Fibonacci => "fibonacci",
            Self::Alternating => "alternating",
        }
    }

    const fn title(self) -> &'static str {
        match self {
            Self::Arithmetic => "Arithmetic",
            Self::Geometric => "Geometric",
            Self::Fibonacci => "Fibonacci",
            Self::Alternating => "Alternating",
        }
    }

    const fn description(self) -> &'static str {
        match self {
            Self::Arithmetic => "Each number increases by a fixed amount",
            Self::Geometric => "Each number is multiplied by a fixed ratio",
            Self::Fibonacci => "Each number is the sum of the previous two",
            Self::Alternating => "Pattern alternates between two sequences",
        }
    }
}

/// Families available at a level, narrowed by `patternTypes` if given.
fn families(level: usize, allowed: Option<&[String]>) -> Vec<PatternFamily> {
    let named = |f: &PatternFamily| {
        allowed.map_or(true, |list| list.iter().any(|n| n.eq_ignore_ascii_case(f.key())))
    };
    let unlocked: Vec<PatternFamily> = PatternFamily::ALL
        .into_iter()
        .take(level.clamp(1, PatternFamily::ALL.len()))
        .filter(named)
        .collect();
    if !unlocked.is_empty() {
        return unlocked;
    }
    let any_named: Vec<PatternFamily> = PatternFamily::ALL.into_iter().filter(named).collect();
    if any_named.is_empty() {
        vec![PatternFamily::Arithmetic]
    } else {
        any_named
    }
}

fn build(family: PatternFamily, length: usize, rng: &mut ChaCha8Rng) -> Vec<i64> {
    match family {
        PatternFamily::Arithmetic => {
            let start = rng.gen_range(1..=20);
            let step = rng.gen_range(2..=9);
            (0..length as i64).map(|i| start + i * step).collect()
        }
        PatternFamily::Geometric => {
            let start: i64 = rng.gen_range(1..=5);
            let ratio: i64 = rng.gen_range(2..=3);
            let mut term = start;
            (0..length)
                .map(|_| {
                    let current = term;
                    term = term.saturating_mul(ratio);
                    current
                })
                .collect()
        }
        PatternFamily::Fibonacci => {
            let mut seq = vec![rng.gen_range(1..=9), rng.gen_range(1..=9)];
            while seq.len() < length {
                let next = seq[seq.len() - 1] + seq[seq.len() - 2];
                seq.push(next);
            }
            seq.truncate(length);
            seq
        }
        PatternFamily::Alternating => {
            let (a, b) = (rng.gen_range(1..=20), rng.gen_range(20..=60));
            let (da, db) = (rng.gen_range(2..=6), -rng.gen_range(1..=4));
            (0..length as i64)
                .map(|i| if i % 2 == 0 { a + (i / 2) * da } else { b + (i / 2) * db })
                .collect()
        }
    }
}

/// Sequence pattern generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternAlgorithm;

impl PuzzleAlgorithm for PatternAlgorithm {
    fn puzzle_type(&self) -> PuzzleType {
        PuzzleType::Pattern
    }

    fn draft(&self, request: &DraftRequest<'_>, rng: &mut ChaCha8Rng) -> Draft {
        let difficulty = request.difficulty;
        let length = request
            .size("sequenceLength", difficulty.pick(tables::PATTERN_LENGTHS))
            .clamp(MIN_LENGTH, MAX_LENGTH);
        let level = request
            .size("patternComplexity", difficulty.pick(tables::PATTERN_LEVELS))
            .clamp(1, 4);
        let revealed = (length as f64 * difficulty.pick(tables::PATTERN_REVEAL_RATIOS)).floor() as usize;

        let pool = families(level, request.list("patternTypes"));
        let family = pool[rng.gen_range(0..pool.len())];
        let sequence = build(family, length, rng);

        // leading terms stay visible so every family can be refit
        let anchor = if family == PatternFamily::Alternating { 4 } else { 2 };
        let mut candidates: Vec<usize> = (anchor.min(length - 1)..length).collect();
        candidates.shuffle(rng);
        let missing = request
            .size("missingCount", length.saturating_sub(revealed))
            .clamp(1, candidates.len());
        let mut hidden: Vec<usize> = candidates.into_iter().take(missing).collect();
        hidden.sort_unstable();

        let answer: Vec<i64> = hidden.iter().map(|i| sequence[*i]).collect();
        let shown: Vec<Option<i64>> = sequence
            .iter()
            .enumerate()
            .map(|(i, v)| (!hidden.contains(&i)).then_some(*v))
            .collect();

        let mut steps = vec!["Identify the pattern rule from the visible terms".to_string()];
        steps.extend(
            hidden
                .iter()
                .zip(&answer)
                .map(|(i, v)| format!("Position {} is {v}", i + 1)),
        );
        steps.push("Verify every term against the rule".to_string());

        Draft {
            title: format!("Pattern Recognition: {}", family.title()),
            description: "Identify the pattern and complete the sequence.".to_string(),
            content: PuzzleContent::Pattern(PatternContent {
                sequence: shown,
                sequence_length: length,
            }),
            solution: Solution {
                answer: Answer::Numbers(answer),
                explanation: format!("The sequence follows the pattern: {}", family.description()),
                steps,
            },
            hints: vec![
                format!("The pattern rule: {}", family.description()),
                "Look at the differences between consecutive numbers".to_string(),
                format!("The first missing term is at position {}", hidden[0] + 1),
            ],
            metrics: QualityMetrics {
                complexity: ((level + 1) as f64 / 5.0).min(1.0),
                uniqueness: rng.gen_range(0.4..1.0),
                clarity: 0.85,
                solvability: 0.95,
                engagement_potential: 0.85,
            },
            solvability_score: 0.95,
            validation_score: 0.88,
            estimated_solve_time: 120 + 40 * level as u32,
        }
    }
}

// =============================================================================
// CHECKER
// =============================================================================

/// Fibonacci numbers with `fib(-1) = 1`.
fn fib(i: i64) -> i128 {
    if i < 0 {
        return 1;
    }
    let (mut a, mut b) = (0i128, 1i128);
    for _ in 0..i {
        let next = a + b;
        a = b;
        b = next;
    }
    a
}

fn fit_arithmetic(points: &[(i64, i64)]) -> Option<(i128, i128)> {
    let (&(p, vp), rest) = points.split_first()?;
    let &(q, vq) = rest.first()?;
    let span = i128::from(q - p);
    let delta = i128::from(vq) - i128::from(vp);
    if delta % span != 0 {
        return None;
    }
    let step = delta / span;
    let start = i128::from(vp) - i128::from(p) * step;
    points
        .iter()
        .all(|&(i, v)| start + i128::from(i) * step == i128::from(v))
        .then_some((start, step))
}

type Predictor = Box<dyn Fn(i64) -> i128>;

/// Every family hypothesis consistent with the revealed terms.
fn fits(revealed: &[(i64, i64)]) -> Vec<Predictor> {
    let mut out: Vec<Predictor> = Vec::new();

    if let Some((start, step)) = fit_arithmetic(revealed) {
        out.push(Box::new(move |i| start + i128::from(i) * step));
    }

    if let Some(&(p, vp)) = revealed.first() {
        for ratio in FIT_RATIOS {
            let r = i128::from(ratio);
            let Some(scale) = u32::try_from(p).ok().and_then(|e| r.checked_pow(e)) else {
                continue;
            };
            if i128::from(vp) % scale != 0 {
                continue;
            }
            let start = i128::from(vp) / scale;
            let predict = move |i: i64| {
                u32::try_from(i)
                    .ok()
                    .and_then(|e| r.checked_pow(e))
                    .and_then(|pow| pow.checked_mul(start))
                    .unwrap_or(i128::MAX)
            };
            if start != 0 && revealed.iter().all(|&(i, v)| predict(i) == i128::from(v)) {
                out.push(Box::new(predict));
            }
        }
    }

    if let &[(p, vp), (q, vq), ..] = revealed {
        let det = fib(p - 1) * fib(q) - fib(p) * fib(q - 1);
        let n0 = i128::from(vp) * fib(q) - fib(p) * i128::from(vq);
        let n1 = fib(p - 1) * i128::from(vq) - i128::from(vp) * fib(q - 1);
        if det != 0 && n0 % det == 0 && n1 % det == 0 {
            let (a0, a1) = (n0 / det, n1 / det);
            let predict = move |i: i64| a0 * fib(i - 1) + a1 * fib(i);
            if revealed.iter().all(|&(i, v)| predict(i) == i128::from(v)) {
                out.push(Box::new(predict));
            }
        }
    }

    let even: Vec<(i64, i64)> = revealed.iter().filter(|(i, _)| i % 2 == 0).map(|&(i, v)| (i / 2, v)).collect();
    let odd: Vec<(i64, i64)> = revealed.iter().filter(|(i, _)| i % 2 == 1).map(|&(i, v)| (i / 2, v)).collect();
    if let (Some((e0, ed)), Some((o0, od))) = (fit_arithmetic(&even), fit_arithmetic(&odd)) {
        out.push(Box::new(move |i| {
            let k = i128::from(i / 2);
            if i % 2 == 0 {
                e0 + k * ed
            } else {
                o0 + k * od
            }
        }));
    }

    out
}

/// Refits every rule family to the visible terms.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternChecker;

impl SolvabilityChecker for PatternChecker {
    fn check(&self, content: &PuzzleContent, answer: &Answer) -> Verdict {
        let PuzzleContent::Pattern(content) = content else {
            return wrong_kind(PuzzleType::Pattern);
        };
        let Answer::Numbers(expected) = answer else {
            return Verdict::Unsolvable("answer is not a list of numbers".to_string());
        };

        let mut revealed = Vec::new();
        let mut hidden = Vec::new();
        for (i, term) in content.sequence.iter().enumerate() {
            let i = i as i64;
            match term {
                Some(v) => revealed.push((i, *v)),
                None => hidden.push(i),
            }
        }
        if hidden.is_empty() || hidden.len() != expected.len() {
            return Verdict::Unsolvable("hidden terms do not match the answer".to_string());
        }

        let hypotheses = fits(&revealed);
        if hypotheses.is_empty() {
            return Verdict::Unsolvable("no rule family fits the visible terms".to_string());
        }
        let predictions: Vec<Vec<i128>> = hypotheses
            .iter()
            .map(|h| hidden.iter().map(|i| h(*i)).collect())
            .collect();
        if predictions.windows(2).any(|w| w[0] != w[1]) {
            return Verdict::Unsolvable("several rules fit with different hidden terms".to_string());
        }
        let agreed = &predictions[0];
        if agreed.iter().zip(expected).all(|(p, e)| *p == i128::from(*e)) {
            Verdict::Solvable
        } else {
            Verdict::Unsolvable("fitted rule disagrees with the stated answer".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzleforge_core::{Difficulty, ParamValue, Parameters, PuzzleSeed};

    fn content(terms: &[Option<i64>]) -> PuzzleContent {
        PuzzleContent::Pattern(PatternContent {
            sequence: terms.to_vec(),
            sequence_length: terms.len(),
        })
    }

    #[test]
    fn test_fib_helper() {
        assert_eq!(fib(-1), 1);
        assert_eq!(fib(0), 0);
        assert_eq!(fib(10), 55);
    }

    #[test]
    fn test_arithmetic_is_solvable() {
        let c = content(&[Some(3), Some(7), None, Some(15), Some(19)]);
        assert!(PatternChecker.check(&c, &Answer::Numbers(vec![11])).is_solvable());
        assert!(!PatternChecker.check(&c, &Answer::Numbers(vec![12])).is_solvable());
    }

    #[test]
    fn test_fibonacci_fit() {
        let c = content(&[Some(2), Some(3), Some(5), None, Some(13), Some(21)]);
        assert!(PatternChecker.check(&c, &Answer::Numbers(vec![8])).is_solvable());
    }

    #[test]
    fn test_underdetermined_is_rejected() {
        let c = content(&[Some(1), Some(2), None, None, None]);
        assert!(!PatternChecker.check(&c, &Answer::Numbers(vec![3, 4, 5])).is_solvable());
    }

    #[test]
    fn test_family_filter() {
        let allowed = vec!["Fibonacci".to_string()];
        assert_eq!(families(4, Some(&allowed)), vec![PatternFamily::Fibonacci]);
        assert_eq!(families(1, Some(&allowed)), vec![PatternFamily::Fibonacci]);
        assert_eq!(families(2, None).len(), 2);
        assert_eq!(families(1, Some(&["spiral".to_string()])), vec![PatternFamily::Arithmetic]);
    }

    #[test]
    fn test_missing_count_parameter() {
        let mut params = Parameters::new();
        params.insert("missingCount".into(), ParamValue::Number(1.0));
        params.insert("sequenceLength".into(), ParamValue::Number(8.0));
        let d = PatternAlgorithm.draft(&DraftRequest::new(Difficulty::Medium, &params), &mut PuzzleSeed::new(5).rng());
        let PuzzleContent::Pattern(c) = &d.content else {
            panic!("not a pattern");
        };
        assert_eq!(c.sequence_length, 8);
        assert_eq!(c.sequence.iter().filter(|t| t.is_none()).count(), 1);
    }
}
