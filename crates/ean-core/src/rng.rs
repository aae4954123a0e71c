//! Run-level RNG for delay sampling.
//!
//! One `DelayRng` is created at the start of a run and passed by `&mut` to
//! every sampling call.  With a configured seed, two runs over the same
//! network draw the same candidates in the same order with the same delay
//! magnitudes.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub struct DelayRng(SmallRng);

impl DelayRng {
    /// Deterministic generator.
    pub fn new(seed: u64) -> Self {
        DelayRng(SmallRng::seed_from_u64(seed))
    }

    /// Seeded when `seed` is set, otherwise drawn from OS entropy.
    pub fn from_config(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::new(s),
            None => DelayRng(SmallRng::from_entropy()),
        }
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Uniform sample in `(0, 1]`, safe to feed into `ln`.
    #[inline]
    pub fn open_unit(&mut self) -> f64 {
        1.0 - self.0.r#gen::<f64>()
    }

    /// Draw `amount` distinct indices out of `0..length`, in draw order.
    ///
    /// # Panics
    /// Panics if `amount > length`; callers clamp or reject beforehand.
    pub fn sample_indices(&mut self, length: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.0, length, amount).into_vec()
    }

    /// Choose a random element from a slice, `None` if it is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
