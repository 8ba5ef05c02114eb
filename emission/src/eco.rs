//! Eco metrics derived from contribution.

/// Computations funding one planted tree.
pub const COMPUTATIONS_PER_TREE: u64 = 100;

pub fn trees_for(computations: u64) -> u64 {
    computations / COMPUTATIONS_PER_TREE
}

/// Quality-of-life index: a display metric, not used in rewards.
pub fn qli_score(computations: u64, eco_actions: u64) -> f64 {
    computations as f64 / 1000.0 + eco_actions as f64 * 0.1
}
