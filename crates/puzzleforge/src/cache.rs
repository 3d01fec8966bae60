//! # Puzzle Cache
//!
//! **Capacity-bounded LRU with lazy TTL expiry**
//!
//! ## Eviction
//!
//! Inserting a new key into a full cache first removes the entry with the
//! fewest hits, ties broken by the oldest timestamp. Size drops to
//! `capacity - 1`, then the new entry goes in.
//!
//! ## Expiry
//!
//! There is no background sweep. An expired entry is removed when a lookup
//! touches it, or by an explicit `optimize` pass.
//!
//! ## Locking
//!
//! One `Mutex` guards the entry map and the hit/miss counters, so every
//! lookup-then-update runs in a single critical section.
//!
//! `get_or_insert_with` also holds a per-key slot lock across lookup,
//! generation and store. Concurrent requests for one key queue on the
//! slot; the first generates, the rest are served the stored entry.
//! Requests for different keys never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use puzzleforge_core::{
    canonical_json, sha256_hex, CacheSettings, GeneratedPuzzle, GenerationConfig, GenerationResult,
};
use serde::Serialize;
use tracing::{debug, info};

/// Bytes per megabyte, for memory estimates.
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Stable cache key for a request.
///
/// SHA-256 over `type:difficulty:parameters:seed`, with `noseed` standing
/// in for an absent seed. Parameter maps serialize in key order, so the key
/// does not depend on how the map was built.
#[must_use]
pub fn generate_cache_key(config: &GenerationConfig) -> String {
    let seed = config.seed.map_or_else(|| "noseed".to_string(), |s| s.to_string());
    sha256_hex(format!(
        "{}:{}:{}:{}",
        config.puzzle_type,
        config.difficulty,
        canonical_json(&config.parameters),
        seed
    ))
}

/// One cached puzzle.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    /// The cached artifact.
    pub puzzle: GeneratedPuzzle,
    /// When the entry was last written.
    pub timestamp: DateTime<Utc>,
    /// Time to live in milliseconds.
    pub ttl_ms: u64,
    /// Successful lookups.
    pub hits: u64,
    /// Hits plus writes.
    pub usage_count: u64,
}

impl CacheEntry {
    /// True once `now - timestamp > ttl`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let age = (now - self.timestamp).num_milliseconds();
        age > i64::try_from(self.ttl_ms).unwrap_or(i64::MAX)
    }

    fn size_bytes(&self) -> usize {
        canonical_json(&self.puzzle).len()
    }
}

/// Result of an `optimize` pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeOutcome {
    /// Entries removed because their TTL had passed.
    pub expired_removed: usize,
    /// Low-usage entries removed to bring occupancy down.
    pub evicted: usize,
    /// Serialized size of everything removed.
    pub bytes_freed: usize,
    /// Entries left afterwards.
    pub remaining: usize,
}

/// Point-in-time view of the cache.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheDiagnostics {
    /// Entries held.
    pub size: usize,
    /// Maximum entries.
    pub capacity: usize,
    /// `size / capacity` as a percentage.
    pub utilization_pct: f64,
    /// Oldest entry timestamp.
    pub oldest_entry: Option<DateTime<Utc>>,
    /// Newest entry timestamp.
    pub newest_entry: Option<DateTime<Utc>>,
    /// Mean entry age in minutes.
    pub average_age_minutes: f64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheState {
    /// Removes the least-used entry. Returns its key.
    fn evict_lru(&mut self) -> Option<String> {
        let key = self
            .entries
            .iter()
            .min_by(|(_, a), (_, b)| a.hits.cmp(&b.hits).then(a.timestamp.cmp(&b.timestamp)))
            .map(|(key, _)| key.clone())?;
        self.entries.remove(&key);
        self.evictions += 1;
        Some(key)
    }
}

/// Thread-safe puzzle cache.
pub struct PuzzleCache {
    settings: CacheSettings,
    state: Mutex<CacheState>,
    /// Per-key slots held while a key is being filled.
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Default for PuzzleCache {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}

impl PuzzleCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            settings,
            state: Mutex::new(CacheState::default()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// The settings in use.
    #[must_use]
    pub const fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Looks up a puzzle.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<GeneratedPuzzle> {
        self.get_at(key, Utc::now())
    }

    /// Looks up a puzzle as of `now`. An expired entry is removed and
    /// counts as a miss.
    #[must_use]
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<GeneratedPuzzle> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let expired = match state.entries.get_mut(key) {
            None => {
                state.misses += 1;
                return None;
            }
            Some(entry) if entry.is_expired_at(now) => true,
            Some(entry) => {
                entry.hits += 1;
                entry.usage_count += 1;
                let puzzle = entry.puzzle.clone();
                state.hits += 1;
                return Some(puzzle);
            }
        };
        if expired {
            state.entries.remove(key);
            debug!(key, "cache entry expired");
        }
        state.misses += 1;
        None
    }

    /// Stores a puzzle. `ttl_ms` defaults to the configured TTL.
    pub fn store(&self, key: &str, puzzle: GeneratedPuzzle, ttl_ms: Option<u64>) {
        self.store_at(key, puzzle, ttl_ms, Utc::now());
    }

    /// Stores a puzzle as of `now`.
    pub fn store_at(&self, key: &str, puzzle: GeneratedPuzzle, ttl_ms: Option<u64>, now: DateTime<Utc>) {
        let ttl_ms = ttl_ms.unwrap_or(self.settings.default_ttl_ms);
        let mut state = self.state.lock();

        if let Some(entry) = state.entries.get_mut(key) {
            entry.puzzle = puzzle;
            entry.timestamp = now;
            entry.ttl_ms = ttl_ms;
            entry.usage_count += 1;
            return;
        }

        if state.entries.len() >= self.settings.capacity {
            if let Some(evicted) = state.evict_lru() {
                debug!(key = %evicted, "cache full, evicted least used entry");
            }
        }
        state.entries.insert(
            key.to_string(),
            CacheEntry {
                puzzle,
                timestamp: now,
                ttl_ms,
                hits: 0,
                usage_count: 1,
            },
        );
    }

    /// Returns the cached puzzle for `key`, or runs `generate` and stores
    /// its result.
    ///
    /// The key's slot is held from the lookup until the store, so a second
    /// caller for the same key waits and then takes the cache hit instead
    /// of generating again.
    ///
    /// # Errors
    ///
    /// Whatever `generate` returns. Nothing is stored on error.
    pub fn get_or_insert_with<F>(
        &self,
        key: &str,
        ttl_ms: Option<u64>,
        generate: F,
    ) -> GenerationResult<GeneratedPuzzle>
    where
        F: FnOnce() -> GenerationResult<GeneratedPuzzle>,
    {
        let slot = self.acquire_slot(key);
        let result = {
            let _filling = slot.lock();
            if let Some(puzzle) = self.get(key) {
                debug!(key, puzzle_id = %puzzle.id, "served from cache");
                Ok(puzzle)
            } else {
                generate().map(|puzzle| {
                    self.store(key, puzzle.clone(), ttl_ms);
                    puzzle
                })
            }
        };
        self.release_slot(key, slot);
        result
    }

    fn acquire_slot(&self, key: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.in_flight.lock().entry(key.to_string()).or_default())
    }

    fn release_slot(&self, key: &str, slot: Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock();
        drop(slot);
        if in_flight.get(key).is_some_and(|s| Arc::strong_count(s) == 1) {
            in_flight.remove(key);
        }
    }

    /// Keys currently being filled.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Removes one entry. Returns whether it was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.state.lock().entries.remove(key).is_some()
    }

    /// Removes every entry. Counters are kept.
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    /// Whether `key` is present, expired or not.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.state.lock().entries.contains_key(key)
    }

    /// A copy of one entry, without touching its counters.
    #[must_use]
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.state.lock().entries.get(key).cloned()
    }

    /// Entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(hits, misses, evictions)` since creation.
    #[must_use]
    pub fn counters(&self) -> (u64, u64, u64) {
        let state = self.state.lock();
        (state.hits, state.misses, state.evictions)
    }

    /// `hits / (hits + misses)`, or 0 before any lookup.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let state = self.state.lock();
        let lookups = state.hits + state.misses;
        if lookups == 0 {
            0.0
        } else {
            state.hits as f64 / lookups as f64
        }
    }

    /// Serialized size of every cached puzzle, in megabytes.
    #[must_use]
    pub fn memory_estimate_mb(&self) -> f64 {
        let bytes: usize = self.state.lock().entries.values().map(CacheEntry::size_bytes).sum();
        bytes as f64 / BYTES_PER_MB
    }

    /// Maintenance pass.
    pub fn optimize(&self) -> OptimizeOutcome {
        self.optimize_at(Utc::now())
    }

    /// Maintenance pass as of `now`.
    ///
    /// Drops expired entries. If occupancy is still above the configured
    /// ratio, drops the configured fraction of the remaining entries with
    /// the lowest usage count.
    pub fn optimize_at(&self, now: DateTime<Utc>) -> OptimizeOutcome {
        let mut state = self.state.lock();
        let mut outcome = OptimizeOutcome::default();

        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, e)| e.is_expired_at(now))
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            if let Some(entry) = state.entries.remove(&key) {
                outcome.bytes_freed += entry.size_bytes();
                outcome.expired_removed += 1;
            }
        }

        let threshold = self.settings.capacity as f64 * self.settings.optimize_occupancy_ratio;
        if state.entries.len() as f64 > threshold {
            let mut by_usage: Vec<(String, u64, DateTime<Utc>)> = state
                .entries
                .iter()
                .map(|(k, e)| (k.clone(), e.usage_count, e.timestamp))
                .collect();
            by_usage.sort_by(|a, b| a.1.cmp(&b.1).then(a.2.cmp(&b.2)));

            let count = (by_usage.len() as f64 * self.settings.optimize_evict_fraction).floor() as usize;
            for (key, _, _) in by_usage.into_iter().take(count) {
                if let Some(entry) = state.entries.remove(&key) {
                    outcome.bytes_freed += entry.size_bytes();
                    outcome.evicted += 1;
                }
            }
            state.evictions += outcome.evicted as u64;
        }

        outcome.remaining = state.entries.len();
        info!(
            expired = outcome.expired_removed,
            evicted = outcome.evicted,
            bytes_freed = outcome.bytes_freed,
            remaining = outcome.remaining,
            "cache optimized"
        );
        outcome
    }

    /// Size, utilisation and entry ages.
    #[must_use]
    pub fn diagnostics(&self) -> CacheDiagnostics {
        self.diagnostics_at(Utc::now())
    }

    /// Size, utilisation and entry ages as of `now`.
    #[must_use]
    pub fn diagnostics_at(&self, now: DateTime<Utc>) -> CacheDiagnostics {
        let state = self.state.lock();
        let size = state.entries.len();
        let oldest_entry = state.entries.values().map(|e| e.timestamp).min();
        let newest_entry = state.entries.values().map(|e| e.timestamp).max();
        let average_age_minutes = if size == 0 {
            0.0
        } else {
            let total_ms: i64 = state
                .entries
                .values()
                .map(|e| (now - e.timestamp).num_milliseconds())
                .sum();
            total_ms as f64 / size as f64 / 60_000.0
        };

        CacheDiagnostics {
            size,
            capacity: self.settings.capacity,
            utilization_pct: if self.settings.capacity == 0 {
                0.0
            } else {
                size as f64 / self.settings.capacity as f64 * 100.0
            },
            oldest_entry,
            newest_entry,
            average_age_minutes,
        }
    }
}
