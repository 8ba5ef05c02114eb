//! Shared reputation handle.

use crate::model::Reputation;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// One account's reputation, shared between the ledger account that owns it
/// and the validator registry that weighs it.
///
/// Clones point at the same record. The lock is a leaf: nothing else is
/// acquired while it is held.
#[derive(Clone, Debug, Default)]
pub struct SharedReputation(Arc<RwLock<Reputation>>);

impl SharedReputation {
    pub fn new(reputation: Reputation) -> Self {
        Self(Arc::new(RwLock::new(reputation)))
    }

    pub fn score(&self) -> f64 {
        self.read().score
    }

    /// A copy of the current record.
    pub fn snapshot(&self) -> Reputation {
        self.read().clone()
    }

    pub fn record_contribution(&self, uptime: u64, honest: bool) -> f64 {
        let mut rep = self.write();
        rep.record_contribution(uptime, honest);
        rep.score
    }

    pub fn record_invalid_auth(&self) -> f64 {
        let mut rep = self.write();
        rep.record_invalid_auth();
        rep.score
    }

    /// Whether two handles refer to the same record.
    pub fn ptr_eq(&self, other: &SharedReputation) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn read(&self) -> RwLockReadGuard<'_, Reputation> {
        self.0.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Reputation> {
        self.0.write().unwrap_or_else(|e| e.into_inner())
    }
}
