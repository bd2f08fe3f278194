// Copyright 2026 the Motion Provider Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pseudo-random fallback readings.

use core::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sample::{Axes, Motion};

/// Produces uniformly distributed readings in `[-1.0, 1.0]` on all six axes.
///
/// The generator returns a [`Motion`], not a [`Sample`](crate::sample::Sample):
/// the caller decides which instant the reading belongs to.
pub struct SyntheticGenerator<R = StdRng> {
    rng: R,
}

impl<R> fmt::Debug for SyntheticGenerator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticGenerator").finish_non_exhaustive()
    }
}

impl SyntheticGenerator {
    /// Creates a generator seeded from operating-system entropy.
    #[must_use]
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Creates a generator with a fixed seed, for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SyntheticGenerator<R> {
    /// Wraps an existing random source.
    #[must_use]
    pub const fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Draws one reading.
    pub fn generate(&mut self) -> Motion {
        Motion::new(self.axes(), self.axes())
    }

    fn axes(&mut self) -> Axes {
        Axes::new(
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::WallTime;

    #[test]
    fn readings_stay_in_unit_range() {
        let mut generator = SyntheticGenerator::seeded(7);
        for _ in 0..10_000 {
            let sample = generator.generate().at(WallTime(0));
            for v in sample.readings() {
                assert!((-1.0..=1.0).contains(&v), "{v} out of range");
            }
        }
    }

    #[test]
    fn axes_are_not_constant() {
        let mut generator = SyntheticGenerator::seeded(1);
        let first = generator.generate();
        let varied = (0..100).any(|_| generator.generate() != first);
        assert!(varied, "generator produced the same reading 100 times");
    }

    #[test]
    fn readings_cover_both_signs() {
        let mut generator = SyntheticGenerator::seeded(42);
        let values: Vec<f64> = (0..1_000)
            .flat_map(|_| generator.generate().at(WallTime(0)).readings())
            .collect();
        assert!(values.iter().any(|&v| v < -0.9), "no values near -1");
        assert!(values.iter().any(|&v| v > 0.9), "no values near +1");
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SyntheticGenerator::seeded(99);
        let mut b = SyntheticGenerator::seeded(99);
        for _ in 0..16 {
            assert_eq!(a.generate(), b.generate());
        }
    }
}
