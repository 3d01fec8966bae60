//! # Batch Orchestration
//!
//! Sequential or bounded-parallel generation of many puzzles.
//!
//! Parallel mode runs `batch_size` scoped workers per group. Workers send
//! `(index, result)` through a bounded crossbeam channel sized to the
//! group, and the group is fully joined before the next one starts, so at
//! most `batch_size` generations are ever in flight.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use puzzleforge_core::{Difficulty, GeneratedPuzzle, GenerationError, GenerationResult, PuzzleType};
use tracing::{debug, info, warn};

/// What to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchRequest {
    /// Number of puzzles.
    pub count: usize,
    /// Type of every puzzle.
    pub puzzle_type: PuzzleType,
    /// Difficulty of every puzzle.
    pub difficulty: Difficulty,
    /// Run groups concurrently.
    pub parallel: bool,
    /// Group width in parallel mode. Zero is treated as one.
    pub batch_size: usize,
}

/// What a batch produced.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Successful puzzles in request order.
    pub puzzles: Vec<GeneratedPuzzle>,
    /// Items that produced a puzzle.
    pub success_count: usize,
    /// Items that failed.
    pub failure_count: usize,
    /// Width of each joined group. Sequential mode reports one group.
    pub groups: Vec<usize>,
    /// Wall time for the whole batch.
    pub total_time: Duration,
    /// `(index, error)` for each failed item.
    pub errors: Vec<(usize, GenerationError)>,
}

/// Runs `generate(index)` for every index in `0..request.count`.
pub fn run_batch<F>(request: &BatchRequest, generate: F) -> BatchOutcome
where
    F: Fn(usize) -> GenerationResult<GeneratedPuzzle> + Sync,
{
    let start = Instant::now();
    let (results, groups) = if request.parallel {
        run_parallel(request, &generate)
    } else {
        let results = (0..request.count).map(|i| (i, generate(i))).collect();
        (results, vec![request.count])
    };

    let mut outcome = BatchOutcome {
        puzzles: Vec::with_capacity(request.count),
        success_count: 0,
        failure_count: 0,
        groups,
        total_time: Duration::ZERO,
        errors: Vec::new(),
    };
    for (index, result) in results {
        match result {
            Ok(puzzle) => {
                outcome.success_count += 1;
                outcome.puzzles.push(puzzle);
            }
            Err(err) => {
                warn!(index, error = %err, "batch item failed");
                outcome.failure_count += 1;
                outcome.errors.push((index, err));
            }
        }
    }
    outcome.total_time = start.elapsed();

    info!(
        puzzle_type = %request.puzzle_type,
        difficulty = %request.difficulty,
        count = request.count,
        parallel = request.parallel,
        succeeded = outcome.success_count,
        failed = outcome.failure_count,
        elapsed_ms = outcome.total_time.as_secs_f64() * 1000.0,
        "batch finished"
    );
    outcome
}

type Indexed = (usize, GenerationResult<GeneratedPuzzle>);

fn run_parallel<F>(request: &BatchRequest, generate: &F) -> (Vec<Indexed>, Vec<usize>)
where
    F: Fn(usize) -> GenerationResult<GeneratedPuzzle> + Sync,
{
    let width = request.batch_size.max(1);
    let mut results = Vec::with_capacity(request.count);
    let mut groups = Vec::new();

    let mut first = 0;
    while first < request.count {
        let last = (first + width).min(request.count);
        let (tx, rx) = bounded::<Indexed>(last - first);

        thread::scope(|scope| {
            for index in first..last {
                let tx = tx.clone();
                scope.spawn(move || tx.send((index, generate(index))).ok());
            }
        });
        drop(tx);

        results.extend(rx.try_iter());
        debug!(group = groups.len(), start = first, width = last - first, "batch group joined");
        groups.push(last - first);
        first = last;
    }

    results.sort_by_key(|(index, _)| *index);
    (results, groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzleforge_core::GenerationConfig;
    use puzzleforge_procedural::GenerationDispatcher;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(count: usize, parallel: bool, batch_size: usize) -> BatchRequest {
        BatchRequest {
            count,
            puzzle_type: PuzzleType::Math,
            difficulty: Difficulty::Medium,
            parallel,
            batch_size,
        }
    }

    #[test]
    fn test_parallel_groups_are_bounded() {
        let dispatcher = GenerationDispatcher::default();
        let outcome = run_batch(&request(25, true, 10), |i| {
            dispatcher.generate(&GenerationConfig::new(PuzzleType::Math, Difficulty::Medium).with_seed(i as u64))
        });

        assert_eq!(outcome.groups, vec![10, 10, 5]);
        assert_eq!(outcome.success_count + outcome.failure_count, 25);
        assert_eq!(outcome.success_count, 25);
    }

    #[test]
    fn test_parallel_keeps_request_order() {
        let dispatcher = GenerationDispatcher::default();
        let generate = |i: usize| {
            dispatcher.generate(&GenerationConfig::new(PuzzleType::Pattern, Difficulty::Easy).with_seed(i as u64))
        };
        let parallel = run_batch(&request(7, true, 3), generate);
        let sequential = run_batch(&request(7, false, 3), generate);

        let contents = |o: &BatchOutcome| o.puzzles.iter().map(|p| p.content.clone()).collect::<Vec<_>>();
        assert_eq!(contents(&parallel), contents(&sequential));
        assert_eq!(sequential.groups, vec![7]);
    }

    #[test]
    fn test_failures_are_counted() {
        let calls = AtomicUsize::new(0);
        let outcome = run_batch(&request(6, true, 4), |i| {
            calls.fetch_add(1, Ordering::Relaxed);
            Err(GenerationError::UnknownPuzzleType(format!("item-{i}")))
        });

        assert_eq!(calls.load(Ordering::Relaxed), 6);
        assert_eq!(outcome.failure_count, 6);
        assert!(outcome.puzzles.is_empty());
        assert_eq!(outcome.errors.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_zero_batch_size_runs_one_at_a_time() {
        let outcome = run_batch(&request(3, true, 0), |i| {
            Err(GenerationError::Serialization(i.to_string()))
        });
        assert_eq!(outcome.groups, vec![1, 1, 1]);
    }
}
