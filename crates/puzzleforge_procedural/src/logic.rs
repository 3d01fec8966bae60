//! # Logic Deduction Puzzles
//!
//! Match `n` people to `n` distinct values of one category.
//!
//! ## Generation
//!
//! 1. Draw a hidden permutation (person → value).
//! 2. Enumerate every permutation as the candidate solution space.
//! 3. Greedily add true clues, each time sampling a handful of unused
//!    candidates and keeping the one that eliminates the most survivors,
//!    until one survivor remains and the minimum clue count is met.
//!
//! ## Checking
//!
//! `LogicChecker` ignores the generator and solves the clues from scratch
//! with backtracking, stopping at two solutions.

use std::collections::BTreeMap;

use puzzleforge_core::{
    tables, Answer, LogicClue, LogicContent, PuzzleContent, PuzzleType, QualityMetrics, Solution,
};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::algorithm::{wrong_kind, Draft, DraftRequest, PuzzleAlgorithm, SolvabilityChecker, Verdict};

/// Candidates sampled per greedy step.
const CANDIDATES_PER_STEP: usize = 10;

/// Hard bounds on the number of people.
const MIN_PEOPLE: usize = 2;
const MAX_PEOPLE: usize = 8;

const PEOPLE: [&str; MAX_PEOPLE] = ["Alice", "Ben", "Cara", "Dev", "Ema", "Finn", "Gus", "Hana"];

struct Category {
    noun: &'static str,
    values: [&'static str; MAX_PEOPLE],
}

const CATEGORIES: [Category; 3] = [
    Category {
        noun: "color",
        values: ["Red", "Blue", "Green", "Yellow", "Purple", "Orange", "White", "Black"],
    },
    Category {
        noun: "fruit",
        values: ["Apple", "Banana", "Cherry", "Date", "Elderberry", "Fig", "Grape", "Kiwi"],
    },
    Category {
        noun: "time slot",
        values: ["8am", "9am", "10am", "11am", "12pm", "1pm", "2pm", "3pm"],
    },
];

const TITLES: [&str; 4] = [
    "Detective's Deduction",
    "Logic Grid Challenge",
    "Constraint Puzzle",
    "Reasoning Test",
];

/// True when `assignment` (person index → value index) satisfies `clue`.
fn satisfies(clue: &LogicClue, assignment: &[usize]) -> bool {
    match *clue {
        LogicClue::Equality { variable, value } => assignment[variable] == value,
        LogicClue::Inequality { variable, value } => assignment[variable] != value,
        LogicClue::Position { first, second } => assignment[first] < assignment[second],
    }
}

fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn extend(current: &mut Vec<usize>, used: &mut [bool], out: &mut Vec<Vec<usize>>) {
        if current.len() == used.len() {
            out.push(current.clone());
            return;
        }
        for v in 0..used.len() {
            if !used[v] {
                used[v] = true;
                current.push(v);
                extend(current, used, out);
                current.pop();
                used[v] = false;
            }
        }
    }

    let mut out = Vec::new();
    extend(&mut Vec::with_capacity(n), &mut vec![false; n], &mut out);
    out
}

fn clue_text(clue: &LogicClue, people: &[String], values: &[String], noun: &str) -> String {
    match *clue {
        LogicClue::Equality { variable, value } => {
            format!("{} has the {} {}", people[variable], noun, values[value])
        }
        LogicClue::Inequality { variable, value } => {
            format!("{} does not have the {} {}", people[variable], noun, values[value])
        }
        LogicClue::Position { first, second } => {
            format!("{}'s {noun} is listed before {}'s", people[first], people[second])
        }
    }
}

/// Logic deduction generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogicAlgorithm;

impl PuzzleAlgorithm for LogicAlgorithm {
    fn puzzle_type(&self) -> PuzzleType {
        PuzzleType::Logic
    }

    fn draft(&self, request: &DraftRequest<'_>, rng: &mut ChaCha8Rng) -> Draft {
        let difficulty = request.difficulty;
        let table_size = difficulty.pick(tables::LOGIC_VARIABLES);
        let n = request
            .size("variableCount", request.size("gridSize", table_size))
            .clamp(MIN_PEOPLE, MAX_PEOPLE);
        let min_clues = request.size("constraintCount", difficulty.pick(tables::LOGIC_CONSTRAINTS));

        let category = &CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
        let people: Vec<String> = pick_sorted(n, rng).into_iter().map(|i| PEOPLE[i].to_string()).collect();
        let values: Vec<String> = pick_sorted(n, rng)
            .into_iter()
            .map(|i| category.values[i].to_string())
            .collect();

        let mut hidden: Vec<usize> = (0..n).collect();
        hidden.shuffle(rng);

        let clues = select_clues(&hidden, min_clues, rng);
        let clue_text: Vec<String> = clues
            .iter()
            .map(|c| clue_text(c, &people, &values, category.noun))
            .collect();

        let assignment: BTreeMap<String, String> = people
            .iter()
            .zip(&hidden)
            .map(|(p, v)| (p.clone(), values[*v].clone()))
            .collect();

        let mut steps: Vec<String> = clue_text
            .iter()
            .enumerate()
            .map(|(i, text)| format!("Step {}: apply \"{text}\"", i + 1))
            .collect();
        steps.push("Only one assignment satisfies every clue".to_string());

        let description = format!(
            "Match each person to exactly one {noun} using the clues ({difficulty}). \
             The {noun}s, in list order: {}.",
            values.join(", "),
            noun = category.noun
        );
        let title = format!("Logic Deduction: {}", TITLES[rng.gen_range(0..TITLES.len())]);
        let clue_count = clues.len();

        Draft {
            title,
            description,
            content: PuzzleContent::Logic(LogicContent {
                variables: people,
                values,
                clues,
                clue_text,
                grid_size: n,
            }),
            solution: Solution {
                answer: Answer::Assignment(assignment),
                explanation: format!(
                    "Each person holds exactly one {}, and only one assignment satisfies all clues.",
                    category.noun
                ),
                steps,
            },
            hints: vec![
                format!("There are {n} people to match"),
                "Start with the clues that name an exact value".to_string(),
                "Use elimination to narrow down the possibilities".to_string(),
            ],
            metrics: QualityMetrics {
                complexity: (clue_count as f64 / (n as f64 * 2.5)).min(1.0),
                uniqueness: rng.gen_range(0.4..1.0),
                clarity: 0.85,
                solvability: 1.0,
                engagement_potential: 0.8,
            },
            solvability_score: 1.0,
            validation_score: 0.9,
            estimated_solve_time: 300 + 20 * u32::try_from(clue_count).unwrap_or(u32::MAX / 40),
        }
    }
}

/// `count` distinct indexes below `MAX_PEOPLE`, ascending.
fn pick_sorted(count: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..MAX_PEOPLE).collect();
    idx.shuffle(rng);
    idx.truncate(count);
    idx.sort_unstable();
    idx
}

/// Greedy clue selection over the enumerated solution space.
fn select_clues(hidden: &[usize], min_clues: usize, rng: &mut ChaCha8Rng) -> Vec<LogicClue> {
    let n = hidden.len();
    let mut pool: Vec<LogicClue> = Vec::new();
    for variable in 0..n {
        for value in 0..n {
            if hidden[variable] == value {
                pool.push(LogicClue::Equality { variable, value });
            } else {
                pool.push(LogicClue::Inequality { variable, value });
            }
        }
        for second in 0..n {
            if hidden[variable] < hidden[second] {
                pool.push(LogicClue::Position {
                    first: variable,
                    second,
                });
            }
        }
    }
    pool.shuffle(rng);

    let max_equalities = n / 2;
    let mut equalities = 0;
    let mut survivors = permutations(n);
    let mut chosen = Vec::new();

    while !pool.is_empty() && (survivors.len() > 1 || chosen.len() < min_clues) {
        let allowed: Vec<usize> = (0..pool.len())
            .filter(|i| equalities < max_equalities || !matches!(pool[*i], LogicClue::Equality { .. }))
            .take(CANDIDATES_PER_STEP)
            .collect();
        let Some(&first) = allowed.first() else {
            break;
        };

        let best = if survivors.len() > 1 {
            allowed
                .iter()
                .copied()
                .min_by_key(|i| survivors.iter().filter(|s| satisfies(&pool[*i], s)).count())
                .unwrap_or(first)
        } else {
            first
        };

        let clue = pool.remove(best);
        if matches!(clue, LogicClue::Equality { .. }) {
            equalities += 1;
        }
        survivors.retain(|s| satisfies(&clue, s));
        chosen.push(clue);
    }
    chosen
}

/// Backtracking solver for logic content.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogicChecker;

impl LogicChecker {
    /// Counts solutions, stopping at `limit`.
    #[must_use]
    pub fn count_solutions(content: &LogicContent, limit: usize) -> (usize, Option<Vec<usize>>) {
        fn search(
            clues: &[LogicClue],
            assignment: &mut Vec<usize>,
            used: &mut [bool],
            limit: usize,
            found: &mut (usize, Option<Vec<usize>>),
        ) {
            if found.0 >= limit {
                return;
            }
            let n = used.len();
            if assignment.len() == n {
                found.0 += 1;
                if found.1.is_none() {
                    found.1 = Some(assignment.clone());
                }
                return;
            }
            let var = assignment.len();
            for value in 0..n {
                if used[value] {
                    continue;
                }
                assignment.push(value);
                let consistent = clues.iter().all(|clue| match *clue {
                    LogicClue::Equality { variable, .. } | LogicClue::Inequality { variable, .. }
                        if variable != var =>
                    {
                        true
                    }
                    LogicClue::Position { first, second } if first.max(second) != var => true,
                    ref c => satisfies(c, assignment),
                });
                if consistent {
                    used[value] = true;
                    search(clues, assignment, used, limit, found);
                    used[value] = false;
                }
                assignment.pop();
            }
        }

        let n = content.variables.len();
        let mut found = (0, None);
        search(&content.clues, &mut Vec::with_capacity(n), &mut vec![false; n], limit, &mut found);
        found
    }
}

impl SolvabilityChecker for LogicChecker {
    fn check(&self, content: &PuzzleContent, answer: &Answer) -> Verdict {
        let PuzzleContent::Logic(content) = content else {
            return wrong_kind(PuzzleType::Logic);
        };
        let Answer::Assignment(expected) = answer else {
            return Verdict::Unsolvable("answer is not an assignment".to_string());
        };

        let n = content.variables.len();
        if n == 0 || content.values.len() != n {
            return Verdict::Unsolvable("variables and values differ in count".to_string());
        }
        let in_range = content.clues.iter().all(|c| match *c {
            LogicClue::Equality { variable, value } | LogicClue::Inequality { variable, value } => {
                variable < n && value < n
            }
            LogicClue::Position { first, second } => first < n && second < n,
        });
        if !in_range {
            return Verdict::Unsolvable("clue refers to an unknown variable or value".to_string());
        }

        match Self::count_solutions(content, 2) {
            (0, _) => Verdict::Unsolvable("clues are contradictory".to_string()),
            (1, Some(solution)) => {
                let solved: BTreeMap<String, String> = content
                    .variables
                    .iter()
                    .zip(&solution)
                    .map(|(p, v)| (p.clone(), content.values[*v].clone()))
                    .collect();
                if &solved == expected {
                    Verdict::Solvable
                } else {
                    Verdict::Unsolvable("unique solution differs from the stated answer".to_string())
                }
            }
            _ => Verdict::Unsolvable("clues admit more than one solution".to_string()),
        }
    }
}
