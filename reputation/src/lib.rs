//! Reputation and anti-cheat for the Triad ledger.
//!
//! - [`model`]: the bounded trust score and the three update channels
//!   (honest work, cheating, failed authentication).
//! - [`shared`]: the handle an account and the validator registry both hold.
//! - [`auditor`]: heuristics that decide whether a contribution report is honest.

pub mod auditor;
pub mod error;
pub mod model;
pub mod shared;

pub use auditor::{AuditConfig, AuditVerdict, CheatReason, ContributionAuditor, RateWindow, DEFAULT_CHEAT_CEILING};
pub use error::ReputationError;
pub use model::{
    Reputation, AUTH_FAILURE_ALLOWANCE, AUTH_PENALTY, CHEAT_PENALTY, INITIAL_SCORE, MAX_SCORE,
    MIN_SCORE,
};
pub use shared::SharedReputation;
