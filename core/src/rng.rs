//! Deterministic random number generation for parameter sampling.
//!
//! RULE: The flow model never draws random numbers. Randomness exists
//! only in the sensitivity harness, and all of it flows through
//! SampleRng instances derived from one master seed.
//!
//! Each sampled dimension gets its own stream, seeded from
//! (master_seed XOR dimension_index · golden-ratio constant). This means:
//!   - Adding a dimension never changes the draws of existing ones.
//!   - Each dimension's stream is reproducible in isolation.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG for one sampling dimension.
pub struct SampleRng {
    inner: Pcg64Mcg,
}

impl SampleRng {
    /// The index must stay stable for a given dimension.
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen()
    }

    /// A uniformly random permutation of 0..n.
    pub fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut self.inner);
        order
    }
}

/// All sampling streams for one experiment.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_dimension(&self, index: usize) -> SampleRng {
        SampleRng::new(self.master_seed, index as u64)
    }
}
