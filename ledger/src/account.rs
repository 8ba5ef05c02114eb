//! Accounts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use triad_reputation::{Reputation, SharedReputation};
use triad_types::{Address, DeviceId, PocContribution, TokenAmount};

/// A live account held by the ledger.
///
/// `reputation` is the same handle the validator registry holds.
#[derive(Clone, Debug)]
pub struct Account {
    pub address: Address,
    pub balance: TokenAmount,
    pub last_nonce: u64,
    pub devices: BTreeSet<DeviceId>,
    pub reputation: SharedReputation,
    pub contribution: PocContribution,
    pub trees_planted: u64,
}

impl Account {
    pub fn new(address: Address, device: DeviceId, balance: TokenAmount) -> Self {
        Self {
            address,
            balance,
            last_nonce: 0,
            devices: BTreeSet::from([device]),
            reputation: SharedReputation::default(),
            contribution: PocContribution::default(),
            trees_planted: 0,
        }
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            address: self.address.clone(),
            balance: self.balance,
            last_nonce: self.last_nonce,
            devices: self.devices.clone(),
            reputation: self.reputation.snapshot(),
            contribution: self.contribution,
            trees_planted: self.trees_planted,
        }
    }

    fn from_snapshot(snapshot: AccountSnapshot) -> Self {
        Self {
            address: snapshot.address,
            balance: snapshot.balance,
            last_nonce: snapshot.last_nonce,
            devices: snapshot.devices,
            reputation: SharedReputation::new(snapshot.reputation),
            contribution: snapshot.contribution,
            trees_planted: snapshot.trees_planted,
        }
    }
}

impl From<AccountSnapshot> for Account {
    fn from(snapshot: AccountSnapshot) -> Self {
        Self::from_snapshot(snapshot)
    }
}

/// A point-in-time copy of an account, detached from the live reputation.
///
/// This is the persisted form and what queries return.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub address: Address,
    pub balance: TokenAmount,
    pub last_nonce: u64,
    pub devices: BTreeSet<DeviceId>,
    pub reputation: Reputation,
    pub contribution: PocContribution,
    pub trees_planted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_has_one_device_and_fresh_reputation() {
        let acct = Account::new(Address::new("a"), DeviceId::new("phone"), TokenAmount::new(1000));
        assert_eq!(acct.devices.len(), 1);
        assert_eq!(acct.last_nonce, 0);
        assert_eq!(acct.reputation.score(), 1.0);
    }

    #[test]
    fn snapshot_detaches_reputation() {
        let acct = Account::new(Address::new("a"), DeviceId::new("phone"), TokenAmount::new(1000));
        let snap = acct.snapshot();
        acct.reputation.record_contribution(0, false);
        assert_eq!(snap.reputation.score, 1.0);

        let restored = Account::from(snap.clone());
        assert!(!restored.reputation.ptr_eq(&acct.reputation));
        assert_eq!(restored.snapshot(), snap);
    }
}
