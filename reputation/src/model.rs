//! The reputation score.
//!
//! A score is a trust multiplier in `[MIN_SCORE, MAX_SCORE]`. It feeds both the
//! emission reward and the validator weight, so every update clamps.

use serde::{Deserialize, Serialize};

pub const MIN_SCORE: f64 = 0.1;
pub const MAX_SCORE: f64 = 2.0;
pub const INITIAL_SCORE: f64 = 1.0;

/// Multiplier applied on a cheat-flagged report.
pub const CHEAT_PENALTY: f64 = 0.9;
/// Multiplier applied on each failed authentication past the allowance.
pub const AUTH_PENALTY: f64 = 0.8;
/// Failed authentications tolerated before penalties start.
pub const AUTH_FAILURE_ALLOWANCE: u64 = 5;

/// Gain per honest report is `HONEST_GAIN * ln(1 + uptime)`.
const HONEST_GAIN: f64 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reputation {
    pub score: f64,
    /// Cumulative uptime units from honest reports.
    pub contributions: u64,
    pub cheat_attempts: u64,
    pub invalid_auth_attempts: u64,
}

impl Default for Reputation {
    fn default() -> Self {
        Self::new()
    }
}

impl Reputation {
    pub fn new() -> Self {
        Self {
            score: INITIAL_SCORE,
            contributions: 0,
            cheat_attempts: 0,
            invalid_auth_attempts: 0,
        }
    }

    /// Apply one contribution report's verdict.
    pub fn record_contribution(&mut self, uptime: u64, honest: bool) {
        if honest {
            self.contributions = self.contributions.saturating_add(uptime);
            let gain = HONEST_GAIN * (uptime as f64).ln_1p();
            self.score = clamp(self.score + gain);
        } else {
            self.cheat_attempts = self.cheat_attempts.saturating_add(1);
            self.score = clamp(self.score * CHEAT_PENALTY);
        }
    }

    /// Count a failed authentication. Penalizes once the allowance is spent.
    pub fn record_invalid_auth(&mut self) {
        self.invalid_auth_attempts = self.invalid_auth_attempts.saturating_add(1);
        if self.invalid_auth_attempts > AUTH_FAILURE_ALLOWANCE {
            self.score = clamp(self.score * AUTH_PENALTY);
        }
    }
}

fn clamp(score: f64) -> f64 {
    if score.is_nan() {
        return MIN_SCORE;
    }
    score.clamp(MIN_SCORE, MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_initial_score() {
        let r = Reputation::new();
        assert_eq!(r.score, 1.0);
        assert_eq!(r.contributions, 0);
    }

    #[test]
    fn honest_report_grows_by_log_uptime() {
        let mut r = Reputation::new();
        r.record_contribution(10, true);
        let expected = 1.0 + 0.01 * 11f64.ln();
        assert!((r.score - expected).abs() < 1e-12);
        assert_eq!(r.contributions, 10);
        assert_eq!(r.cheat_attempts, 0);
    }

    #[test]
    fn honest_zero_uptime_keeps_score() {
        let mut r = Reputation::new();
        r.record_contribution(0, true);
        assert_eq!(r.score, 1.0);
    }

    #[test]
    fn cheat_multiplies_by_penalty() {
        let mut r = Reputation::new();
        r.record_contribution(500, false);
        assert!((r.score - 0.9).abs() < 1e-12);
        assert_eq!(r.cheat_attempts, 1);
        assert_eq!(r.contributions, 0);
    }

    #[test]
    fn cheat_floors_at_minimum() {
        let mut r = Reputation::new();
        for _ in 0..100 {
            r.record_contribution(0, false);
        }
        assert_eq!(r.score, MIN_SCORE);
        assert_eq!(r.cheat_attempts, 100);
    }

    #[test]
    fn honest_caps_at_maximum() {
        let mut r = Reputation::new();
        for _ in 0..10_000 {
            r.record_contribution(u64::MAX, true);
        }
        assert_eq!(r.score, MAX_SCORE);
    }

    #[test]
    fn auth_failures_within_allowance_are_free() {
        let mut r = Reputation::new();
        for _ in 0..AUTH_FAILURE_ALLOWANCE {
            r.record_invalid_auth();
        }
        assert_eq!(r.score, 1.0);
        r.record_invalid_auth();
        assert!((r.score - 0.8).abs() < 1e-12);
        r.record_invalid_auth();
        assert!((r.score - 0.64).abs() < 1e-12);
        assert_eq!(r.invalid_auth_attempts, 7);
    }

    #[test]
    fn auth_channel_does_not_touch_cheat_counter() {
        let mut r = Reputation::new();
        for _ in 0..10 {
            r.record_invalid_auth();
        }
        assert_eq!(r.cheat_attempts, 0);
    }
}
