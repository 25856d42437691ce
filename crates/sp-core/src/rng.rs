//! Deterministic RNG for design generation.
//!
//! The design is the shared instrument every respondent answers against, so
//! it must be exactly reproducible from its seed.  `DesignRng` wraps a
//! `SmallRng` seeded from a single `u64`; all draws made by the generator go
//! through it, in a fixed order.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Seeded RNG used by the design generator.
///
/// Single-threaded by construction: generation runs once, before any session.
pub struct DesignRng(SmallRng);

impl DesignRng {
    pub fn new(seed: u64) -> Self {
        DesignRng(SmallRng::seed_from_u64(seed))
    }

    /// Uniform draw in `[0, 1)`, used as the balancing tie-break.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
