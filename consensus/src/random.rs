//! Randomness for leader selection.

use rand::Rng;

/// Yields uniformly distributed fractions in `[0, 1)`.
///
/// Injected so tests can fix the draw.
pub trait RandomSource: Send + Sync {
    fn next_fraction(&self) -> f64;
}

/// Thread-local RNG from `rand`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_fraction(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}
