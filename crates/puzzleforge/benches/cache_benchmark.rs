//! Benchmark for cache operations.
//!
//! TARGET: key derivation under 10µs, insert-with-eviction on a full
//! 10,000-entry cache under 2ms
//!
//! Run with: cargo bench --package puzzleforge --bench cache_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use puzzleforge::{generate_cache_key, Difficulty, GenerationConfig, PuzzleCache, PuzzleType};
use puzzleforge_core::CacheSettings;
use puzzleforge_procedural::GenerationDispatcher;

fn benchmark_cache_key(c: &mut Criterion) {
    let config = GenerationConfig::new(PuzzleType::Word, Difficulty::Hard)
        .with_parameter("wordCount", 8.0)
        .with_parameter("wordDatabase", "technology")
        .with_seed(42);

    c.bench_function("generate_cache_key", |b| {
        b.iter(|| black_box(generate_cache_key(black_box(&config))));
    });
}

fn benchmark_lookup_and_evict(c: &mut Criterion) {
    let puzzle = GenerationDispatcher::default()
        .generate(&GenerationConfig::new(PuzzleType::Math, Difficulty::Medium).with_seed(1))
        .unwrap();
    let cache = PuzzleCache::new(CacheSettings::default());
    let capacity = cache.settings().capacity;
    for i in 0..capacity {
        cache.store(&format!("key-{i}"), puzzle.clone(), None);
    }

    c.bench_function("cache_hit", |b| {
        b.iter(|| black_box(cache.get(black_box("key-500"))));
    });

    let mut next = capacity;
    c.bench_function("cache_insert_full_evicts", |b| {
        b.iter(|| {
            next += 1;
            cache.store(&format!("key-{next}"), puzzle.clone(), None);
        });
    });
}

criterion_group!(benches, benchmark_cache_key, benchmark_lookup_and_evict);
criterion_main!(benches);
