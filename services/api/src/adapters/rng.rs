//! services/api/src/adapters/rng.rs
//!
//! The production implementation of the `RandomSource` port, backed by `rand`.

use chat_core::ports::RandomSource;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A `RandomSource` over a `StdRng`, seeded from the OS or from a fixed seed.
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_os() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A reproducible source, used when `SIMULATOR_SEED` is set.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn gen_range(&mut self, low: u64, high: u64) -> u64 {
        self.rng.random_range(low..high)
    }
}
