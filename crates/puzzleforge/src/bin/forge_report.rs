//! # Forge Report
//!
//! Runs a mixed workload through one engine and prints its reports.
//!
//! ```text
//! forge_report [config.toml]
//! RUST_LOG=puzzleforge=debug forge_report
//! ```

use std::error::Error;
use std::time::Instant;

use puzzleforge::{Difficulty, EngineConfig, GenerationConfig, PuzzleEngine, PuzzleType};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Seeded requests per type and difficulty.
const SEEDS_PER_BUCKET: u64 = 3;

/// Size of the closing parallel batch.
const BATCH_COUNT: usize = 25;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "loading engine config");
            EngineConfig::from_file(&path)?
        }
        None => EngineConfig::default(),
    };
    let engine = PuzzleEngine::new(config)?;

    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║              PUZZLEFORGE WORKLOAD REPORT                    ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();

    // =========================================================================
    // STEP 1: One seeded puzzle per bucket, then the same requests again
    // =========================================================================
    let started = Instant::now();
    let mut generated = 0usize;
    let mut failed = 0usize;
    for puzzle_type in PuzzleType::ALL {
        for difficulty in Difficulty::ALL {
            for seed in 0..SEEDS_PER_BUCKET {
                let config = GenerationConfig::new(puzzle_type, difficulty).with_seed(seed);
                match engine.generate(&config) {
                    Ok(_) => generated += 1,
                    Err(err) => {
                        warn!(%puzzle_type, %difficulty, seed, error = %err, "generation failed");
                        failed += 1;
                    }
                }
            }
        }
    }
    for puzzle_type in PuzzleType::ALL {
        let _ = engine.generate(&GenerationConfig::new(puzzle_type, Difficulty::Easy).with_seed(0));
    }
    println!("Mixed workload:   {generated} generated, {failed} failed in {:?}", started.elapsed());

    // =========================================================================
    // STEP 2: Parallel batch
    // =========================================================================
    let batch = engine.batch(BATCH_COUNT, PuzzleType::Word, Difficulty::Hard, true, None);
    println!(
        "Parallel batch:   {} ok, {} failed, groups {:?}, {:?}",
        batch.success_count, batch.failure_count, batch.groups, batch.total_time
    );

    // =========================================================================
    // STEP 3: Tuning and maintenance
    // =========================================================================
    let start_params = engine
        .tuner()
        .optimize_for_difficulty(PuzzleType::Pattern, Difficulty::Hard);
    let tuning = engine.tune(PuzzleType::Pattern, &start_params);
    println!(
        "Pattern tuning:   quality {:.3} -> {:.3} over {} candidates",
        tuning.metrics.original_quality, tuning.metrics.optimized_quality, tuning.metrics.candidates_evaluated
    );
    let maintenance = engine.maintain();
    println!("Cache maintenance: {}", serde_json::to_string(&maintenance)?);
    println!("Cache diagnostics: {}", serde_json::to_string(&engine.cache_diagnostics())?);
    println!();

    print!("{}", engine.performance_report());
    println!();
    print!("{}", engine.variety_report());

    Ok(())
}
