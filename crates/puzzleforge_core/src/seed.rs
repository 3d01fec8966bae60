//! # Puzzle Seeds
//!
//! Deterministic, request-local randomness.
//!
//! ## Determinism Guarantee
//!
//! Every generation call builds its own `ChaCha8Rng` from a `PuzzleSeed`.
//! Nothing is shared between calls, so two calls with the same seed produce
//! the same stream on any thread, in any order, on any platform.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed for one generation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PuzzleSeed(u64);

impl PuzzleSeed {
    /// Creates a seed from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Draws a fresh seed from OS entropy.
    ///
    /// The generator used for the draw lives only for this call.
    #[must_use]
    pub fn draw() -> Self {
        let mut rng = ChaCha8Rng::from_entropy();
        Self(rng.next_u64())
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives an independent sub-seed for a specific purpose.
    ///
    /// Used for retry attempts: attempt `n` of seed `s` is always the same
    /// seed, so retries stay reproducible.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // splitmix64 finaliser over (seed ^ purpose * golden ratio)
        let mut z = self.0 ^ purpose.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self(z ^ (z >> 31))
    }

    /// Builds the PRNG stream for this seed.
    #[inline]
    #[must_use]
    pub fn rng(self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.0)
    }
}

impl From<u64> for PuzzleSeed {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = PuzzleSeed::new(42).rng();
        let mut b = PuzzleSeed::new(42).rng();
        for _ in 0..100 {
            assert_eq!(a.gen::<u64>(), b.gen::<u64>());
        }
    }

    #[test]
    fn test_derive_is_stable_and_distinct() {
        let seed = PuzzleSeed::new(7);
        assert_eq!(seed.derive(1), seed.derive(1));
        assert_ne!(seed.derive(1), seed.derive(2));
        assert_ne!(seed.derive(1), seed);
    }

    #[test]
    fn test_streams_are_independent_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| PuzzleSeed::new(99).rng().gen::<u64>()))
            .collect();
        let values: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(values.windows(2).all(|w| w[0] == w[1]));
    }
}
