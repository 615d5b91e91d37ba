use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform random draws used for spawning, color picks and automation phase.
pub trait RandomSource {
    /// A value in `[lo, hi)`. Returns `lo` when the range is empty.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64;

    /// An index in `[0, len)`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        let i = self.uniform(0.0, len as f64).floor() as usize;
        i.min(len.saturating_sub(1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        (**self).uniform(lo, hi)
    }

    fn index(&mut self, len: usize) -> usize {
        (**self).index(len)
    }
}

/// [`RandomSource`] backed by a seedable [`StdRng`].
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if !lo.is_finite() || !hi.is_finite() || hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..hi)
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sim/random.rs"]
mod tests;
