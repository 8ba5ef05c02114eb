//! Proof-of-Contribution metrics.

use serde::{Deserialize, Serialize};

/// One contribution report, or an account's running aggregate of them.
///
/// Storage and bandwidth arrive as fractional units from clients; the rest
/// are counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PocContribution {
    pub computations: u64,
    pub storage: f64,
    pub bandwidth: f64,
    pub uptime: u64,
    pub eco_actions: u64,
}

impl PocContribution {
    /// Fold another report into this aggregate. Counters saturate.
    pub fn accumulate(&mut self, other: &PocContribution) {
        self.computations = self.computations.saturating_add(other.computations);
        self.storage += other.storage;
        self.bandwidth += other.bandwidth;
        self.uptime = self.uptime.saturating_add(other.uptime);
        self.eco_actions = self.eco_actions.saturating_add(other.eco_actions);
    }
}
