//! Reward computation.

use crate::error::EmissionError;
use serde::{Deserialize, Serialize};
use triad_types::{PocContribution, TokenAmount};

/// Per-metric reward weights.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricWeights {
    pub computations: f64,
    pub storage: f64,
    pub bandwidth: f64,
    pub uptime: f64,
    pub eco_actions: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            computations: 1.0,
            storage: 0.5,
            bandwidth: 0.2,
            uptime: 0.1,
            eco_actions: 2.0,
        }
    }
}

/// Network-size multiplier.
///
/// Small networks get a bootstrap bonus; past 100 participants the factor
/// decays as `1 / ln(n + 1)`.
pub fn emission_factor(participants: usize) -> f64 {
    match participants {
        n if n < 10 => 2.0,
        n if n < 100 => 1.5,
        n => 1.0 / ((n as f64) + 1.0).ln(),
    }
}

#[derive(Clone, Debug, Default)]
pub struct EmissionEngine {
    weights: MetricWeights,
}

impl EmissionEngine {
    pub fn new(weights: MetricWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &MetricWeights {
        &self.weights
    }

    /// `Σ metric × weight × score × factor`, unrounded.
    pub fn reward(&self, report: &PocContribution, score: f64, participants: usize) -> f64 {
        let w = &self.weights;
        let base = report.computations as f64 * w.computations
            + report.storage * w.storage
            + report.bandwidth * w.bandwidth
            + report.uptime as f64 * w.uptime
            + report.eco_actions as f64 * w.eco_actions;
        base * score * emission_factor(participants)
    }

    /// The reward floored to whole tokens.
    pub fn mint(
        &self,
        report: &PocContribution,
        score: f64,
        participants: usize,
    ) -> Result<TokenAmount, EmissionError> {
        let reward = self.reward(report, score, participants);
        if !reward.is_finite() || reward < 0.0 {
            return Err(EmissionError::NonFiniteReward(reward));
        }
        let floored = reward.floor();
        // u64::MAX as f64 rounds up to 2^64, which is itself out of range.
        if floored >= u64::MAX as f64 {
            return Err(EmissionError::RewardOverflow(reward));
        }
        Ok(TokenAmount::new(floored as u64))
    }
}
