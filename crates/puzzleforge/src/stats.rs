//! # Performance Statistics
//!
//! Rolling generation and validation timings plus the bottleneck
//! heuristics that read them.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

/// Cache hit rate below which the cache is flagged.
pub const LOW_HIT_RATE: f64 = 0.3;
/// Generations required before the hit rate is judged.
pub const HIT_RATE_MIN_GENERATIONS: u64 = 100;
/// Average generation time (ms) above which generation is flagged.
pub const SLOW_GENERATION_MS: f64 = 1000.0;
/// Average validation time (ms) above which validation is flagged.
pub const SLOW_VALIDATION_MS: f64 = 500.0;
/// Cache memory estimate (MB) above which memory is flagged.
pub const HIGH_MEMORY_MB: f64 = 500.0;
/// Combined average (ms) above which the pipeline is flagged.
pub const SLOW_PIPELINE_MS: f64 = 1500.0;
/// Samples shown in the report trend.
const TREND_SAMPLES: usize = 10;

/// Fixed-capacity window of the most recent samples.
#[derive(Clone, Debug)]
pub struct RollingWindow {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl RollingWindow {
    /// Creates an empty window.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Adds a sample, dropping the oldest when full.
    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Mean of the held samples, 0 when empty.
    #[must_use]
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.samples.iter().sum::<f64>() / self.samples.len() as f64
        }
    }

    /// The most recent `n` samples, oldest first.
    #[must_use]
    pub fn last(&self, n: usize) -> Vec<f64> {
        self.samples.iter().skip(self.samples.len().saturating_sub(n)).copied().collect()
    }

    /// Samples held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Snapshot of engine performance.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    /// Mean of the recent generation times.
    pub average_generation_ms: f64,
    /// Mean of the recent validation times.
    pub average_validation_ms: f64,
    /// `hits / (hits + misses)`.
    pub cache_hit_rate: f64,
    /// Generations recorded since creation.
    pub total_generations: u64,
    /// Entries in the cache.
    pub cache_size: usize,
    /// Serialized size of the cache, in MB.
    pub memory_usage_mb: f64,
    /// Most recent generation times, oldest first.
    pub generation_trend_ms: Vec<f64>,
}

/// How urgent a bottleneck is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth watching.
    Medium,
    /// Needs action.
    High,
}

/// A detected bottleneck.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bottleneck {
    /// Affected component.
    pub component: &'static str,
    /// What is wrong.
    pub issue: &'static str,
    /// How urgent.
    pub severity: Severity,
    /// Suggested fix.
    pub recommendation: &'static str,
}

/// Applies the bottleneck heuristics to a snapshot.
#[must_use]
pub fn analyze_bottlenecks(stats: &PerformanceStats) -> Vec<Bottleneck> {
    let mut found = Vec::new();

    if stats.total_generations >= HIT_RATE_MIN_GENERATIONS && stats.cache_hit_rate < LOW_HIT_RATE {
        found.push(Bottleneck {
            component: "cache",
            issue: "low cache hit rate",
            severity: Severity::Medium,
            recommendation: "Increase cache TTL or pre-generate common configurations",
        });
    }
    if stats.average_generation_ms > SLOW_GENERATION_MS {
        found.push(Bottleneck {
            component: "generation",
            issue: "slow generation",
            severity: Severity::High,
            recommendation: "Reduce algorithm complexity or enable parallel batches",
        });
    }
    if stats.average_validation_ms > SLOW_VALIDATION_MS {
        found.push(Bottleneck {
            component: "validation",
            issue: "slow validation",
            severity: Severity::Medium,
            recommendation: "Shrink the uniqueness history window",
        });
    }
    if stats.memory_usage_mb > HIGH_MEMORY_MB {
        found.push(Bottleneck {
            component: "memory",
            issue: "high memory usage",
            severity: Severity::High,
            recommendation: "Run cache optimization more often or lower capacity",
        });
    }
    if stats.average_generation_ms + stats.average_validation_ms > SLOW_PIPELINE_MS {
        found.push(Bottleneck {
            component: "pipeline",
            issue: "pipeline slow, parallelize",
            severity: Severity::High,
            recommendation: "Use parallel batch generation",
        });
    }

    found
}

struct MonitorState {
    generation: RollingWindow,
    validation: RollingWindow,
    total_generations: u64,
}

/// Thread-safe recorder of generation and validation timings.
pub struct PerformanceMonitor {
    state: Mutex<MonitorState>,
}

impl PerformanceMonitor {
    /// Creates a monitor keeping `window` samples of each timing.
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            state: Mutex::new(MonitorState {
                generation: RollingWindow::new(window),
                validation: RollingWindow::new(window),
                total_generations: 0,
            }),
        }
    }

    /// Records one generation.
    pub fn record_generation(&self, elapsed: Duration) {
        let mut state = self.state.lock();
        state.generation.push(elapsed.as_secs_f64() * 1000.0);
        state.total_generations += 1;
    }

    /// Records one validation.
    pub fn record_validation(&self, elapsed: Duration) {
        self.state.lock().validation.push(elapsed.as_secs_f64() * 1000.0);
    }

    /// Snapshot, combined with cache figures supplied by the caller.
    #[must_use]
    pub fn snapshot(&self, cache_hit_rate: f64, cache_size: usize, memory_usage_mb: f64) -> PerformanceStats {
        let state = self.state.lock();
        PerformanceStats {
            average_generation_ms: state.generation.average(),
            average_validation_ms: state.validation.average(),
            cache_hit_rate,
            total_generations: state.total_generations,
            cache_size,
            memory_usage_mb,
            generation_trend_ms: state.generation.last(TREND_SAMPLES),
        }
    }
}

/// Human-readable performance report.
#[must_use]
pub fn render_performance_report(stats: &PerformanceStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== PUZZLEFORGE PERFORMANCE REPORT ===");
    let _ = writeln!(out, "Generations:        {}", stats.total_generations);
    let _ = writeln!(out, "Avg generation:     {:.2} ms", stats.average_generation_ms);
    let _ = writeln!(out, "Avg validation:     {:.2} ms", stats.average_validation_ms);
    let _ = writeln!(out, "Cache hit rate:     {:.1}%", stats.cache_hit_rate * 100.0);
    let _ = writeln!(out, "Cache size:         {}", stats.cache_size);
    let _ = writeln!(out, "Memory estimate:    {:.3} MB", stats.memory_usage_mb);

    let trend: Vec<String> = stats.generation_trend_ms.iter().map(|ms| format!("{ms:.1}")).collect();
    let _ = writeln!(out, "Generation trend:   [{}]", trend.join(", "));

    let bottlenecks = analyze_bottlenecks(stats);
    if bottlenecks.is_empty() {
        let _ = writeln!(out, "Bottlenecks:        none");
    } else {
        let _ = writeln!(out, "Bottlenecks:");
        for b in bottlenecks {
            let _ = writeln!(out, "  [{:?}] {}: {} -> {}", b.severity, b.component, b.issue, b.recommendation);
        }
    }
    out
}
