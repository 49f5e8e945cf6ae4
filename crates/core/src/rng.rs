//! The single seeded random source every non-deterministic decision draws from.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

#[derive(Clone, Debug)]
pub struct Dice {
    rng: ChaCha8Rng,
}

impl Dice {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    pub fn unit(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform in `[0, 100)`.
    pub fn percent(&mut self) -> f64 {
        self.unit() * 100.0
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.unit() < probability
    }

    pub fn coin(&mut self) -> bool {
        self.chance(0.5)
    }

    /// Uniform integer in `[low, high]`; returns `low` when the range is empty.
    pub fn range_inclusive(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = u64::from(high.abs_diff(low)) + 1;
        low + (self.rng.next_u64() % span) as i32
    }

    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| (self.rng.next_u64() % len as u64) as usize)
    }
}
