//! Nullable random: preset fractions for leader selection.

use std::sync::Mutex;
use triad_consensus::RandomSource;

/// Returns pre-configured fractions in order, cycling when exhausted.
pub struct NullRandom {
    outputs: Vec<f64>,
    index: Mutex<usize>,
}

impl NullRandom {
    pub fn new(outputs: Vec<f64>) -> Self {
        Self {
            outputs,
            index: Mutex::new(0),
        }
    }

    /// The same fraction for every draw.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for NullRandom {
    fn next_fraction(&self) -> f64 {
        if self.outputs.is_empty() {
            return 0.0;
        }
        let mut idx = self.index.lock().unwrap_or_else(|e| e.into_inner());
        let value = self.outputs[*idx % self.outputs.len()];
        *idx += 1;
        value
    }
}
