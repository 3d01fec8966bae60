//! Benchmark for similarity scoring.
//!
//! TARGET: a full 1,000-entry history scan in under 50ms
//!
//! Run with: cargo bench --package puzzleforge_quality --bench similarity_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use puzzleforge_quality::{levenshtein, string_similarity};

fn clue_text(seed: usize) -> String {
    (0..12)
        .map(|i| format!("Person{} does not own Item{}", (seed + i) % 7, (seed * 3 + i) % 5))
        .collect::<Vec<_>>()
        .join("; ")
        .chars()
        .take(200)
        .collect()
}

fn benchmark_levenshtein_prefix(c: &mut Criterion) {
    let a = clue_text(1);
    let b = clue_text(2);

    c.bench_function("levenshtein_200_chars", |bench| {
        bench.iter(|| black_box(levenshtein(black_box(&a), black_box(&b))));
    });
}

fn benchmark_history_scan(c: &mut Criterion) {
    let history: Vec<String> = (0..1_000).map(clue_text).collect();
    let candidate = clue_text(4_242);

    let mut group = c.benchmark_group("history_scan");
    group.throughput(Throughput::Elements(1_000));
    group.sample_size(10);

    group.bench_function("1000_entry_scan", |bench| {
        bench.iter(|| {
            history
                .iter()
                .filter(|h| string_similarity(&candidate, h) >= 0.6)
                .count()
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_levenshtein_prefix, benchmark_history_scan);
criterion_main!(benches);
