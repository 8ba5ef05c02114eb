//! Contribution auditing.
//!
//! Clients self-report their work, so the auditor is the only line between a
//! report and freshly minted tokens. Two heuristics run in order:
//!
//! 1. **Ceiling**: a single report claiming more than `cheat_ceiling`
//!    computations is flagged.
//! 2. **Rate window** (optional): per address, the computations reported
//!    within the last `window_secs` seconds may not exceed `max_computations`.

use crate::error::ReputationError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use triad_types::{Address, PocContribution, Timestamp};

/// Computations above which a single report is treated as cheating.
pub const DEFAULT_CHEAT_CEILING: u64 = 100_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    pub cheat_ceiling: u64,
    pub window: Option<RateWindow>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            cheat_ceiling: DEFAULT_CHEAT_CEILING,
            window: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindow {
    pub window_secs: u64,
    pub max_computations: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheatReason {
    ExceedsCeiling { computations: u64, ceiling: u64 },
    RateExceeded { window_total: u64, max: u64 },
}

/// Outcome of auditing one report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuditVerdict {
    pub honest: bool,
    pub reason: Option<CheatReason>,
}

impl AuditVerdict {
    pub fn honest() -> Self {
        Self {
            honest: true,
            reason: None,
        }
    }

    pub fn cheat(reason: CheatReason) -> Self {
        Self {
            honest: false,
            reason: Some(reason),
        }
    }
}

pub struct ContributionAuditor {
    config: AuditConfig,
    history: Mutex<HashMap<Address, VecDeque<(Timestamp, u64)>>>,
}

impl Default for ContributionAuditor {
    fn default() -> Self {
        Self::new(AuditConfig::default())
    }
}

impl ContributionAuditor {
    pub fn new(config: AuditConfig) -> Self {
        Self {
            config,
            history: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Ceiling heuristic alone.
    pub fn detect_cheat(&self, computations: u64) -> bool {
        computations > self.config.cheat_ceiling
    }

    /// Reject reports whose fractional fields are negative or not finite.
    pub fn validate_report(report: &PocContribution) -> Result<(), ReputationError> {
        if !report.storage.is_finite() || report.storage < 0.0 {
            return Err(ReputationError::InvalidReport(format!(
                "storage must be finite and non-negative, got {}",
                report.storage
            )));
        }
        if !report.bandwidth.is_finite() || report.bandwidth < 0.0 {
            return Err(ReputationError::InvalidReport(format!(
                "bandwidth must be finite and non-negative, got {}",
                report.bandwidth
            )));
        }
        Ok(())
    }

    /// Validate a report and decide whether it is honest, then record it.
    pub fn audit(
        &self,
        address: &Address,
        report: &PocContribution,
        now: Timestamp,
    ) -> Result<AuditVerdict, ReputationError> {
        let verdict = self.assess(address, report, now)?;
        self.record(address, report, now);
        Ok(verdict)
    }

    /// The verdict [`audit`](Self::audit) would give, without touching the
    /// rate window.
    pub fn assess(
        &self,
        address: &Address,
        report: &PocContribution,
        now: Timestamp,
    ) -> Result<AuditVerdict, ReputationError> {
        Self::validate_report(report)?;

        let ceiling_verdict = self.detect_cheat(report.computations).then_some(
            CheatReason::ExceedsCeiling {
                computations: report.computations,
                ceiling: self.config.cheat_ceiling,
            },
        );
        let window_verdict = self
            .config
            .window
            .and_then(|window| self.window_check(address, report.computations, now, window));

        let verdict = match ceiling_verdict.or(window_verdict) {
            Some(reason) => {
                tracing::warn!(%address, ?reason, "contribution report flagged as cheating");
                AuditVerdict::cheat(reason)
            }
            None => AuditVerdict::honest(),
        };
        Ok(verdict)
    }

    /// Add an accepted report to the rate window, flagged or not.
    ///
    /// Also drops every address whose entries have all expired.
    pub fn record(&self, address: &Address, report: &PocContribution, now: Timestamp) {
        let Some(window) = self.config.window else {
            return;
        };
        let mut history = self.history();
        history.retain(|_, entries| {
            while entries
                .front()
                .is_some_and(|&(at, _)| expired(at, now, window))
            {
                entries.pop_front();
            }
            !entries.is_empty()
        });
        history
            .entry(address.clone())
            .or_default()
            .push_back((now, report.computations));
    }

    /// Addresses with at least one report still inside the window.
    pub fn tracked_addresses(&self) -> usize {
        self.history().len()
    }

    fn window_check(
        &self,
        address: &Address,
        computations: u64,
        now: Timestamp,
        window: RateWindow,
    ) -> Option<CheatReason> {
        let history = self.history();
        let recent = history.get(address).map_or(0u64, |entries| {
            entries
                .iter()
                .filter(|&&(at, _)| !expired(at, now, window))
                .fold(0u64, |acc, &(_, c)| acc.saturating_add(c))
        });
        let window_total = recent.saturating_add(computations);
        (window_total > window.max_computations).then_some(CheatReason::RateExceeded {
            window_total,
            max: window.max_computations,
        })
    }

    fn history(&self) -> MutexGuard<'_, HashMap<Address, VecDeque<(Timestamp, u64)>>> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn expired(at: Timestamp, now: Timestamp, window: RateWindow) -> bool {
    at.elapsed_since(now) >= window.window_secs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(computations: u64) -> PocContribution {
        PocContribution {
            computations,
            ..Default::default()
        }
    }

    fn addr() -> Address {
        Address::new("alice")
    }

    #[test]
    fn ceiling_boundary() {
        let auditor = ContributionAuditor::default();
        assert!(!auditor.detect_cheat(100_000));
        assert!(auditor.detect_cheat(100_001));
        assert!(!auditor.detect_cheat(0));
    }

    #[test]
    fn over_ceiling_report_is_flagged() {
        let auditor = ContributionAuditor::default();
        let verdict = auditor.audit(&addr(), &report(200_000), Timestamp::new(1)).unwrap();
        assert!(!verdict.honest);
        assert_eq!(
            verdict.reason,
            Some(CheatReason::ExceedsCeiling {
                computations: 200_000,
                ceiling: 100_000
            })
        );
    }

    #[test]
    fn ordinary_report_is_honest() {
        let auditor = ContributionAuditor::default();
        let verdict = auditor.audit(&addr(), &report(500), Timestamp::new(1)).unwrap();
        assert_eq!(verdict, AuditVerdict::honest());
    }

    #[test]
    fn malformed_report_is_rejected() {
        let auditor = ContributionAuditor::default();
        let bad = PocContribution {
            storage: -1.0,
            ..Default::default()
        };
        let err = auditor.audit(&addr(), &bad, Timestamp::new(1)).unwrap_err();
        assert_eq!(err.kind(), triad_types::ErrorKind::InvalidInput);

        let bad = PocContribution {
            bandwidth: f64::INFINITY,
            ..Default::default()
        };
        assert!(auditor.audit(&addr(), &bad, Timestamp::new(1)).is_err());
    }

    #[test]
    fn window_flags_bursts_and_expires() {
        let auditor = ContributionAuditor::new(AuditConfig {
            cheat_ceiling: DEFAULT_CHEAT_CEILING,
            window: Some(RateWindow {
                window_secs: 60,
                max_computations: 1_000,
            }),
        });
        assert!(auditor.audit(&addr(), &report(600), Timestamp::new(100)).unwrap().honest);
        let burst = auditor.audit(&addr(), &report(600), Timestamp::new(130)).unwrap();
        assert_eq!(
            burst.reason,
            Some(CheatReason::RateExceeded {
                window_total: 1_200,
                max: 1_000
            })
        );
        // Both earlier entries have aged out by t=190.
        assert!(auditor.audit(&addr(), &report(600), Timestamp::new(190)).unwrap().honest);
    }

    #[test]
    fn window_is_per_address() {
        let auditor = ContributionAuditor::new(AuditConfig {
            cheat_ceiling: DEFAULT_CHEAT_CEILING,
            window: Some(RateWindow {
                window_secs: 60,
                max_computations: 1_000,
            }),
        });
        assert!(auditor.audit(&addr(), &report(900), Timestamp::new(0)).unwrap().honest);
        assert!(auditor
            .audit(&Address::new("bob"), &report(900), Timestamp::new(0))
            .unwrap()
            .honest);
    }

    fn windowed() -> ContributionAuditor {
        ContributionAuditor::new(AuditConfig {
            cheat_ceiling: DEFAULT_CHEAT_CEILING,
            window: Some(RateWindow {
                window_secs: 60,
                max_computations: 1_000,
            }),
        })
    }

    #[test]
    fn assess_leaves_window_untouched() {
        let auditor = windowed();
        for _ in 0..3 {
            assert!(auditor.assess(&addr(), &report(800), Timestamp::new(0)).unwrap().honest);
        }
        assert_eq!(auditor.tracked_addresses(), 0);

        auditor.record(&addr(), &report(800), Timestamp::new(0));
        let verdict = auditor.assess(&addr(), &report(800), Timestamp::new(1)).unwrap();
        assert_eq!(
            verdict.reason,
            Some(CheatReason::RateExceeded {
                window_total: 1_600,
                max: 1_000
            })
        );
    }

    #[test]
    fn expired_addresses_are_dropped() {
        let auditor = windowed();
        for i in 0..50 {
            auditor.audit(&Address::new(format!("acct{i}")), &report(10), Timestamp::new(0)).unwrap();
        }
        assert_eq!(auditor.tracked_addresses(), 50);
        auditor.audit(&addr(), &report(10), Timestamp::new(60)).unwrap();
        assert_eq!(auditor.tracked_addresses(), 1);
    }

    #[test]
    fn disabled_window_tracks_nothing() {
        let auditor = ContributionAuditor::default();
        auditor.audit(&addr(), &report(10), Timestamp::new(0)).unwrap();
        assert_eq!(auditor.tracked_addresses(), 0);
    }
}
