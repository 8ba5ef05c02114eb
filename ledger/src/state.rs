//! Ledger state and operations.
//!
//! Every operation takes the single ledger lock for its whole duration, so
//! operations on the same account are linearized. All checks run before the
//! first mutation; a failed operation leaves state untouched.
//!
//! Lock order: ledger, then consensus, then reputation (leaf). The
//! validator registry never calls back into the ledger.

use crate::account::{Account, AccountSnapshot};
use crate::error::LedgerError;
use crate::params::LedgerParams;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use triad_consensus::ConsensusSelector;
use triad_emission::{trees_for, EmissionEngine};
use triad_reputation::ContributionAuditor;
use triad_types::{Address, DeviceId, PocContribution, Timestamp, TokenAmount};

/// Result of crediting one contribution report.
#[derive(Clone, Debug, PartialEq)]
pub struct ContributionReceipt {
    pub tokens_minted: TokenAmount,
    /// Score after the report's verdict was applied.
    pub reputation_score: f64,
    pub cheat_detected: bool,
    pub trees_planted: u64,
    /// The credited account as it stood when the ledger lock was released.
    pub account: AccountSnapshot,
}

/// Both sides of an executed transfer, captured under the ledger lock.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferReceipt {
    pub sender: AccountSnapshot,
    pub recipient: AccountSnapshot,
}

pub struct LedgerState {
    accounts: Mutex<HashMap<Address, Account>>,
    consensus: Arc<ConsensusSelector>,
    auditor: ContributionAuditor,
    emission: EmissionEngine,
    params: LedgerParams,
}

impl LedgerState {
    pub fn new(
        params: LedgerParams,
        consensus: Arc<ConsensusSelector>,
        auditor: ContributionAuditor,
        emission: EmissionEngine,
    ) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            consensus,
            auditor,
            emission,
            params,
        }
    }

    /// Default params, auditor and emission weights.
    pub fn with_consensus(consensus: Arc<ConsensusSelector>) -> Self {
        Self::new(
            LedgerParams::default(),
            consensus,
            ContributionAuditor::default(),
            EmissionEngine::default(),
        )
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    pub fn consensus(&self) -> &Arc<ConsensusSelector> {
        &self.consensus
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Address, Account>> {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create an account with the starting balance and one device, and
    /// register it as a validator.
    pub fn register(
        &self,
        address: Address,
        device_id: DeviceId,
    ) -> Result<AccountSnapshot, LedgerError> {
        let mut accounts = self.lock();
        if accounts.contains_key(&address) && !self.params.allow_reregistration {
            return Err(LedgerError::AlreadyRegistered(address));
        }
        let account = Account::new(address.clone(), device_id, self.params.starting_balance);
        self.consensus
            .upsert(address.clone(), account.balance, account.reputation.clone());
        let snapshot = account.snapshot();
        if accounts.insert(address.clone(), account).is_some() {
            tracing::warn!(%address, "account re-registered and reset");
        } else {
            tracing::info!(%address, "account registered");
        }
        Ok(snapshot)
    }

    /// Move `amount` from `from` to `to`, consuming `nonce`.
    ///
    /// `nonce` must exceed the sender's last nonce; gaps are allowed.
    pub fn execute_transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
        nonce: u64,
    ) -> Result<TransferReceipt, LedgerError> {
        let mut accounts = self.lock();
        if from == to {
            return Err(LedgerError::SelfTransfer(from.clone()));
        }
        let sender = accounts
            .get(from)
            .ok_or_else(|| LedgerError::UnknownAccount(from.clone()))?;
        let recipient = accounts
            .get(to)
            .ok_or_else(|| LedgerError::UnknownAccount(to.clone()))?;
        if nonce <= sender.last_nonce {
            return Err(LedgerError::StaleNonce {
                address: from.clone(),
                nonce,
                last_nonce: sender.last_nonce,
            });
        }
        let sender_balance =
            sender
                .balance
                .checked_sub(amount)
                .ok_or_else(|| LedgerError::InsufficientBalance {
                    address: from.clone(),
                    balance: sender.balance,
                    requested: amount,
                })?;
        let recipient_balance = recipient
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(to.clone()))?;

        let sender = accounts
            .get_mut(from)
            .ok_or_else(|| LedgerError::UnknownAccount(from.clone()))?;
        sender.balance = sender_balance;
        sender.last_nonce = nonce;
        let sender = sender.snapshot();
        let recipient = accounts
            .get_mut(to)
            .ok_or_else(|| LedgerError::UnknownAccount(to.clone()))?;
        recipient.balance = recipient_balance;
        let recipient = recipient.snapshot();
        self.consensus.update_stake(from, sender_balance);
        self.consensus.update_stake(to, recipient_balance);
        tracing::debug!(%from, %to, %amount, nonce, "transfer executed");
        Ok(TransferReceipt { sender, recipient })
    }

    /// Audit a contribution report, mint its reward and fold it into the account.
    ///
    /// The reward uses the score from before this report. A cheat-flagged
    /// report is rewarded as if it claimed the auditor ceiling, then the
    /// penalty applies to the score.
    pub fn credit_contribution(
        &self,
        address: &Address,
        device_id: &DeviceId,
        report: &PocContribution,
        now: Timestamp,
    ) -> Result<ContributionReceipt, LedgerError> {
        let mut accounts = self.lock();
        let participants = accounts.len();
        let account = accounts
            .get_mut(address)
            .ok_or_else(|| LedgerError::UnknownAccount(address.clone()))?;
        if !account.devices.contains(device_id) {
            return Err(LedgerError::DeviceNotFound {
                address: address.clone(),
                device: device_id.clone(),
            });
        }

        let verdict = self.auditor.assess(address, report, now)?;
        let mut rewarded = *report;
        if !verdict.honest {
            rewarded.computations = rewarded
                .computations
                .min(self.auditor.config().cheat_ceiling);
        }
        let score_before = account.reputation.score();
        let minted = self.emission.mint(&rewarded, score_before, participants)?;
        let balance = account
            .balance
            .checked_add(minted)
            .ok_or_else(|| LedgerError::BalanceOverflow(address.clone()))?;

        self.auditor.record(address, report, now);
        let reputation_score = account
            .reputation
            .record_contribution(report.uptime, verdict.honest);
        let trees = trees_for(rewarded.computations);
        account.balance = balance;
        account.contribution.accumulate(report);
        account.trees_planted = account.trees_planted.saturating_add(trees);
        self.consensus.update_stake(address, balance);
        let snapshot = account.snapshot();

        tracing::info!(
            %address,
            %device_id,
            minted = minted.raw(),
            score = reputation_score,
            cheat = !verdict.honest,
            "contribution credited"
        );
        Ok(ContributionReceipt {
            tokens_minted: minted,
            reputation_score,
            cheat_detected: !verdict.honest,
            trees_planted: trees,
            account: snapshot,
        })
    }

    pub fn add_device(
        &self,
        address: &Address,
        device_id: DeviceId,
    ) -> Result<AccountSnapshot, LedgerError> {
        let mut accounts = self.lock();
        let account = accounts
            .get_mut(address)
            .ok_or_else(|| LedgerError::UnknownAccount(address.clone()))?;
        if account.devices.contains(&device_id) {
            return Err(LedgerError::DuplicateDevice {
                address: address.clone(),
                device: device_id,
            });
        }
        account.devices.insert(device_id);
        Ok(account.snapshot())
    }

    pub fn remove_device(
        &self,
        address: &Address,
        device_id: &DeviceId,
    ) -> Result<AccountSnapshot, LedgerError> {
        let mut accounts = self.lock();
        let account = accounts
            .get_mut(address)
            .ok_or_else(|| LedgerError::UnknownAccount(address.clone()))?;
        if !account.devices.remove(device_id) {
            return Err(LedgerError::DeviceNotFound {
                address: address.clone(),
                device: device_id.clone(),
            });
        }
        Ok(account.snapshot())
    }

    /// Penalty channel for failed authentications reported by the transport.
    /// Returns the penalised account.
    pub fn record_invalid_auth(&self, address: &Address) -> Result<AccountSnapshot, LedgerError> {
        let accounts = self.lock();
        let account = accounts
            .get(address)
            .ok_or_else(|| LedgerError::UnknownAccount(address.clone()))?;
        let score = account.reputation.record_invalid_auth();
        tracing::warn!(%address, score, "invalid authentication recorded");
        Ok(account.snapshot())
    }

    pub fn account(&self, address: &Address) -> Option<AccountSnapshot> {
        self.lock().get(address).map(Account::snapshot)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.lock().contains_key(address)
    }

    pub fn balance(&self, address: &Address) -> Option<TokenAmount> {
        self.lock().get(address).map(|a| a.balance)
    }

    /// Aggregate contribution recorded for an account.
    pub fn contribution(&self, address: &Address) -> Option<PocContribution> {
        self.lock().get(address).map(|a| a.contribution)
    }

    pub fn devices(&self, address: &Address) -> Option<BTreeSet<DeviceId>> {
        self.lock().get(address).map(|a| a.devices.clone())
    }

    pub fn participant_count(&self) -> usize {
        self.lock().len()
    }

    pub fn total_supply(&self) -> TokenAmount {
        self.lock().values().map(|a| a.balance).sum()
    }

    pub fn trees_planted(&self, address: &Address) -> Option<u64> {
        self.lock().get(address).map(|a| a.trees_planted)
    }

    pub fn network_trees_planted(&self) -> u64 {
        self.lock()
            .values()
            .fold(0u64, |acc, a| acc.saturating_add(a.trees_planted))
    }

    /// Load a persisted account, replacing any live one, and register it
    /// with the validator table.
    pub fn restore(&self, snapshot: AccountSnapshot) {
        let mut accounts = self.lock();
        let account = Account::from(snapshot);
        self.consensus.upsert(
            account.address.clone(),
            account.balance,
            account.reputation.clone(),
        );
        accounts.insert(account.address.clone(), account);
    }

    /// Snapshots of every account, ordered by address.
    pub fn snapshots(&self) -> Vec<AccountSnapshot> {
        let accounts = self.lock();
        let mut out: Vec<AccountSnapshot> = accounts.values().map(Account::snapshot).collect();
        out.sort_by(|a, b| a.address.cmp(&b.address));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triad_emission::EmissionEngine;
    use triad_reputation::{AuditConfig, ContributionAuditor};
    use triad_types::ErrorKind;

    fn ledger() -> LedgerState {
        LedgerState::with_consensus(Arc::new(ConsensusSelector::new()))
    }

    fn addr(s: &str) -> Address {
        Address::new(s)
    }

    fn dev(s: &str) -> DeviceId {
        DeviceId::new(s)
    }

    fn report(computations: u64, uptime: u64) -> PocContribution {
        PocContribution {
            computations,
            uptime,
            ..Default::default()
        }
    }

    #[test]
    fn register_creates_account_and_validator() {
        let l = ledger();
        let snap = l.register(addr("alice"), dev("d1")).unwrap();
        assert_eq!(snap.balance, TokenAmount::new(1000));
        assert_eq!(snap.last_nonce, 0);
        assert!(snap.devices.contains(&dev("d1")));
        assert_eq!(l.consensus().stake(&addr("alice")), Some(TokenAmount::new(1000)));
        assert_eq!(l.participant_count(), 1);
    }

    #[test]
    fn duplicate_registration_is_conflict() {
        let l = ledger();
        l.register(addr("alice"), dev("d1")).unwrap();
        let err = l.register(addr("alice"), dev("d2")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(l.devices(&addr("alice")).unwrap().len(), 1);
    }

    #[test]
    fn reregistration_resets_when_allowed() {
        let params = LedgerParams {
            allow_reregistration: true,
            ..Default::default()
        };
        let l = LedgerState::new(
            params,
            Arc::new(ConsensusSelector::new()),
            ContributionAuditor::default(),
            EmissionEngine::default(),
        );
        l.register(addr("alice"), dev("d1")).unwrap();
        l.register(addr("bob"), dev("d1")).unwrap();
        l.execute_transfer(&addr("alice"), &addr("bob"), TokenAmount::new(10), 1).unwrap();
        let snap = l.register(addr("alice"), dev("d9")).unwrap();
        assert_eq!(snap.balance, TokenAmount::new(1000));
        assert_eq!(snap.last_nonce, 0);
        assert_eq!(snap.devices, BTreeSet::from([dev("d9")]));
    }

    #[test]
    fn transfer_moves_balance_and_resyncs_stake() {
        let l = ledger();
        l.register(addr("a"), dev("d")).unwrap();
        l.register(addr("b"), dev("d")).unwrap();
        let receipt = l.execute_transfer(&addr("a"), &addr("b"), TokenAmount::new(200), 1).unwrap();
        assert_eq!(receipt.sender, l.account(&addr("a")).unwrap());
        assert_eq!(receipt.recipient, l.account(&addr("b")).unwrap());
        assert_eq!(l.balance(&addr("a")), Some(TokenAmount::new(800)));
        assert_eq!(l.balance(&addr("b")), Some(TokenAmount::new(1200)));
        assert_eq!(l.account(&addr("a")).unwrap().last_nonce, 1);
        assert_eq!(l.consensus().stake(&addr("a")), Some(TokenAmount::new(800)));
        assert_eq!(l.consensus().stake(&addr("b")), Some(TokenAmount::new(1200)));

        let err = l
            .execute_transfer(&addr("a"), &addr("b"), TokenAmount::new(200), 1)
            .unwrap_err();
        assert!(matches!(err, LedgerError::StaleNonce { nonce: 1, last_nonce: 1, .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(l.balance(&addr("a")), Some(TokenAmount::new(800)));
    }

    #[test]
    fn transfer_failures_leave_state_untouched() {
        let l = ledger();
        l.register(addr("a"), dev("d")).unwrap();
        l.register(addr("b"), dev("d")).unwrap();

        let err = l
            .execute_transfer(&addr("a"), &addr("b"), TokenAmount::new(1001), 1)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));

        let err = l
            .execute_transfer(&addr("a"), &addr("ghost"), TokenAmount::new(1), 1)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = l
            .execute_transfer(&addr("a"), &addr("a"), TokenAmount::new(1), 1)
            .unwrap_err();
        assert!(matches!(err, LedgerError::SelfTransfer(_)));

        assert_eq!(l.balance(&addr("a")), Some(TokenAmount::new(1000)));
        assert_eq!(l.account(&addr("a")).unwrap().last_nonce, 0);
        assert_eq!(l.total_supply(), TokenAmount::new(2000));
    }

    #[test]
    fn nonce_gaps_are_allowed() {
        let l = ledger();
        l.register(addr("a"), dev("d")).unwrap();
        l.register(addr("b"), dev("d")).unwrap();
        l.execute_transfer(&addr("a"), &addr("b"), TokenAmount::new(1), 5).unwrap();
        assert!(l.execute_transfer(&addr("a"), &addr("b"), TokenAmount::new(1), 3).is_err());
        l.execute_transfer(&addr("a"), &addr("b"), TokenAmount::new(1), 6).unwrap();
    }

    #[test]
    fn recipient_overflow_is_rejected() {
        let l = ledger();
        l.register(addr("a"), dev("d")).unwrap();
        l.restore(AccountSnapshot {
            balance: TokenAmount::MAX,
            ..l.register(addr("rich"), dev("d")).unwrap()
        });
        let err = l
            .execute_transfer(&addr("a"), &addr("rich"), TokenAmount::new(1), 1)
            .unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow(_)));
        assert_eq!(l.balance(&addr("a")), Some(TokenAmount::new(1000)));
    }

    #[test]
    fn honest_contribution_scenario() {
        let l = ledger();
        l.register(addr("a"), dev("d")).unwrap();
        let receipt = l
            .credit_contribution(&addr("a"), &dev("d"), &report(500, 10), Timestamp::new(1))
            .unwrap();
        assert_eq!(receipt.tokens_minted, TokenAmount::new(1002));
        assert!(!receipt.cheat_detected);
        let expected = 1.0 + 0.01 * 11f64.ln();
        assert!((receipt.reputation_score - expected).abs() < 1e-12);
        assert_eq!(receipt.trees_planted, 5);

        let snap = l.account(&addr("a")).unwrap();
        assert_eq!(receipt.account, snap);
        assert_eq!(snap.balance, TokenAmount::new(2002));
        assert_eq!(snap.contribution.computations, 500);
        assert_eq!(snap.trees_planted, 5);
        assert_eq!(snap.reputation.contributions, 10);
        assert_eq!(l.consensus().stake(&addr("a")), Some(TokenAmount::new(2002)));
        assert_eq!(l.network_trees_planted(), 5);
    }

    #[test]
    fn cheat_contribution_scenario() {
        let l = ledger();
        l.register(addr("a"), dev("d")).unwrap();
        let receipt = l
            .credit_contribution(&addr("a"), &dev("d"), &report(200_000, 0), Timestamp::new(1))
            .unwrap();
        assert!(receipt.cheat_detected);
        assert!((receipt.reputation_score - 0.9).abs() < 1e-12);
        // rewarded at the ceiling with the pre-report score: 100_000 × 1.0 × 2.0
        assert_eq!(receipt.tokens_minted, TokenAmount::new(200_000));
        let snap = l.account(&addr("a")).unwrap();
        assert_eq!(snap.reputation.cheat_attempts, 1);
        assert_eq!(snap.contribution.computations, 200_000);
    }

    #[test]
    fn cheat_at_minimum_score_stays_at_floor() {
        let l = ledger();
        l.register(addr("a"), dev("d")).unwrap();
        for i in 0..40 {
            l.credit_contribution(&addr("a"), &dev("d"), &report(200_000, 0), Timestamp::new(i))
                .unwrap();
        }
        let snap = l.account(&addr("a")).unwrap();
        assert_eq!(snap.reputation.score, 0.1);
        assert_eq!(snap.reputation.cheat_attempts, 40);
    }

    #[test]
    fn contribution_requires_registered_device() {
        let l = ledger();
        l.register(addr("a"), dev("d")).unwrap();
        let err = l
            .credit_contribution(&addr("a"), &dev("other"), &report(1, 1), Timestamp::new(1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = l
            .credit_contribution(&addr("ghost"), &dev("d"), &report(1, 1), Timestamp::new(1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownAccount(_)));
    }

    #[test]
    fn malformed_contribution_is_invalid_input() {
        let l = ledger();
        l.register(addr("a"), dev("d")).unwrap();
        let bad = PocContribution {
            storage: f64::NAN,
            ..Default::default()
        };
        let err = l
            .credit_contribution(&addr("a"), &dev("d"), &bad, Timestamp::new(1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidContribution(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(l.account(&addr("a")).unwrap().reputation.score, 1.0);
    }

    #[test]
    fn contribution_overflow_leaves_state_untouched() {
        let l = ledger();
        l.register(addr("a"), dev("d")).unwrap();
        l.restore(AccountSnapshot {
            balance: TokenAmount::new(u64::MAX - 10),
            ..l.account(&addr("a")).unwrap()
        });
        let err = l
            .credit_contribution(&addr("a"), &dev("d"), &report(500, 10), Timestamp::new(1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow(_)));
        let snap = l.account(&addr("a")).unwrap();
        assert_eq!(snap.reputation.score, 1.0);
        assert_eq!(snap.contribution.computations, 0);
    }

    #[test]
    fn rate_window_flags_repeated_reports() {
        let auditor = ContributionAuditor::new(AuditConfig {
            cheat_ceiling: 100_000,
            window: Some(triad_reputation::RateWindow {
                window_secs: 60,
                max_computations: 1_000,
            }),
        });
        let l = LedgerState::new(
            LedgerParams::default(),
            Arc::new(ConsensusSelector::new()),
            auditor,
            EmissionEngine::default(),
        );
        l.register(addr("a"), dev("d")).unwrap();
        let first = l
            .credit_contribution(&addr("a"), &dev("d"), &report(800, 0), Timestamp::new(0))
            .unwrap();
        assert!(!first.cheat_detected);
        let second = l
            .credit_contribution(&addr("a"), &dev("d"), &report(800, 0), Timestamp::new(10))
            .unwrap();
        assert!(second.cheat_detected);
    }

    #[test]
    fn rejected_credit_does_not_count_toward_window() {
        let auditor = ContributionAuditor::new(AuditConfig {
            cheat_ceiling: 100_000,
            window: Some(triad_reputation::RateWindow {
                window_secs: 60,
                max_computations: 1_000,
            }),
        });
        let l = LedgerState::new(
            LedgerParams::default(),
            Arc::new(ConsensusSelector::new()),
            auditor,
            EmissionEngine::default(),
        );
        let original = l.register(addr("a"), dev("d")).unwrap();
        l.restore(AccountSnapshot {
            balance: TokenAmount::new(u64::MAX - 10),
            ..original.clone()
        });
        let err = l
            .credit_contribution(&addr("a"), &dev("d"), &report(800, 0), Timestamp::new(0))
            .unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow(_)));

        l.restore(original);
        let receipt = l
            .credit_contribution(&addr("a"), &dev("d"), &report(800, 0), Timestamp::new(1))
            .unwrap();
        assert!(!receipt.cheat_detected);
        assert!(receipt.reputation_score >= 1.0);
    }

    #[test]
    fn devices_add_and_remove() {
        let l = ledger();
        l.register(addr("a"), dev("d1")).unwrap();
        let snap = l.add_device(&addr("a"), dev("d2")).unwrap();
        assert_eq!(snap.devices.len(), 2);
        let err = l.add_device(&addr("a"), dev("d2")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        l.remove_device(&addr("a"), &dev("d1")).unwrap();
        let err = l.remove_device(&addr("a"), &dev("d1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(l.devices(&addr("a")).unwrap(), BTreeSet::from([dev("d2")]));
        assert!(l.add_device(&addr("ghost"), dev("x")).is_err());
    }

    #[test]
    fn invalid_auth_decays_after_allowance() {
        let l = ledger();
        l.register(addr("a"), dev("d")).unwrap();
        let mut score = 0.0;
        for _ in 0..6 {
            score = l.record_invalid_auth(&addr("a")).unwrap().reputation.score;
        }
        assert!((score - 0.8).abs() < 1e-12);
        assert!((l.consensus().weight(&addr("a")).unwrap() - 800.0).abs() < 1e-9);
        assert!(l.record_invalid_auth(&addr("ghost")).is_err());
    }

    #[test]
    fn snapshots_restore_into_fresh_ledger() {
        let l = ledger();
        l.register(addr("b"), dev("d")).unwrap();
        l.register(addr("a"), dev("d")).unwrap();
        l.execute_transfer(&addr("a"), &addr("b"), TokenAmount::new(5), 1).unwrap();
        let snaps = l.snapshots();
        assert_eq!(snaps[0].address, addr("a"));

        let fresh = ledger();
        for s in snaps.clone() {
            fresh.restore(s);
        }
        assert_eq!(fresh.snapshots(), snaps);
        assert_eq!(fresh.consensus().len(), 2);
        assert_eq!(fresh.total_supply(), TokenAmount::new(2000));
    }
}
