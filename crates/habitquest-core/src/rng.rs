//! Random number generator abstraction for determinism.
//!
//! The resolution engine never rolls dice itself; callers that need a die
//! value draw it through this trait so tests and replays can inject a
//! recorded sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;
}

/// Rolls one twenty-sided die.
pub fn roll_d20(rng: &mut dyn DeterministicRng) -> u32 {
    rng.next_u32_range(1, 20)
}

/// Production RNG backed by `StdRng`, optionally seeded for reproducible
/// sessions.
#[derive(Debug)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    /// Creates an RNG with a fixed seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates an RNG seeded from the operating system.
    #[must_use]
    pub fn from_os() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }
}

impl DeterministicRng for SeededRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.inner.random_range(min..=max)
    }
}
