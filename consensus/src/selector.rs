//! The validator registry and weighted leader draw.

use crate::error::ConsensusError;
use crate::random::RandomSource;
use crate::validator::ValidatorRecord;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use triad_reputation::SharedReputation;
use triad_types::{Address, PocContribution, TokenAmount};

/// Proposers need a reputation score strictly above this.
pub const TRUST_FLOOR: f64 = 0.5;

/// Where the current proposal round stands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Round {
    /// No leader drawn yet.
    #[default]
    Idle,
    /// The leader may propose.
    Open(Address),
    /// The leader's proposal is being attached; nobody else may propose.
    Claimed(Address),
}

impl Round {
    fn leader(&self) -> Option<&Address> {
        match self {
            Self::Idle => None,
            Self::Open(a) | Self::Claimed(a) => Some(a),
        }
    }
}

/// Validators keyed by address.
///
/// Iteration is in address order, so a given random fraction always picks
/// the same leader from the same registry. Lock order: round, then
/// registry, then reputation. The registry lock is never held while taking
/// the round lock.
#[derive(Default)]
pub struct ConsensusSelector {
    validators: RwLock<BTreeMap<Address, ValidatorRecord>>,
    round: RwLock<Round>,
}

impl ConsensusSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a validator.
    pub fn upsert(&self, address: Address, stake: TokenAmount, reputation: SharedReputation) {
        let record = ValidatorRecord {
            address: address.clone(),
            stake,
            reputation,
        };
        self.write().insert(address, record);
    }

    /// Refresh an existing validator's stake. Returns false if unknown.
    pub fn update_stake(&self, address: &Address, stake: TokenAmount) -> bool {
        match self.write().get_mut(address) {
            Some(record) => {
                record.stake = stake;
                true
            }
            None => false,
        }
    }

    /// Remove a validator. Ends the round if they led it.
    pub fn remove(&self, address: &Address) -> Option<ValidatorRecord> {
        let removed = self.write().remove(address);
        if removed.is_some() {
            let mut round = self.round_write();
            if round.leader() == Some(address) {
                *round = Round::Idle;
            }
        }
        removed
    }

    /// Draw a leader with probability proportional to `stake × score`.
    ///
    /// `None` when there are no validators or the total weight is zero.
    pub fn select_leader(&self, random: &dyn RandomSource) -> Option<Address> {
        let validators = self.read();
        let weighted: Vec<(&Address, f64)> = validators
            .values()
            .map(|v| (&v.address, v.weight()))
            .filter(|(_, w)| w.is_finite() && *w > 0.0)
            .collect();
        let total: f64 = weighted.iter().map(|(_, w)| w).sum();
        if weighted.is_empty() || total <= 0.0 || !total.is_finite() {
            return None;
        }

        let fraction = random.next_fraction();
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let target = fraction * total;
        let mut cumulative = 0.0;
        for (address, weight) in &weighted {
            cumulative += weight;
            if target < cumulative {
                return Some((*address).clone());
            }
        }
        // Rounding can leave target == total; the last candidate owns that tail.
        weighted.last().map(|(address, _)| (*address).clone())
    }

    /// Draw a leader and open a new round for it.
    pub fn elect_leader(&self, random: &dyn RandomSource) -> Option<Address> {
        let mut round = self.round_write();
        self.open_round(&mut round, random)
    }

    /// Elect a leader only if no round exists. Returns the round's leader.
    pub fn ensure_leader(&self, random: &dyn RandomSource) -> Option<Address> {
        let mut round = self.round_write();
        match round.leader() {
            Some(leader) => Some(leader.clone()),
            None => self.open_round(&mut round, random),
        }
    }

    fn open_round(&self, round: &mut Round, random: &dyn RandomSource) -> Option<Address> {
        let leader = self.select_leader(random);
        *round = match &leader {
            Some(address) => {
                tracing::info!(%address, "leader elected");
                Round::Open(address.clone())
            }
            None => {
                tracing::debug!("no eligible leader");
                Round::Idle
            }
        };
        leader
    }

    /// Leader of the current round, whether or not its proposal is in flight.
    pub fn current_leader(&self) -> Option<Address> {
        self.round_read().leader().cloned()
    }

    /// Check `address` as a proposer and take the round for it in one step.
    ///
    /// Until [`release_round`](Self::release_round) or the next election,
    /// every other proposal fails with [`ConsensusError::RoundClaimed`].
    pub fn claim_round(
        &self,
        address: &Address,
        contribution: &PocContribution,
    ) -> Result<(), ConsensusError> {
        let mut round = self.round_write();
        Self::check_round(&round, address)?;
        self.check_trust(address, contribution)?;
        *round = Round::Claimed(address.clone());
        Ok(())
    }

    /// Reopen a round whose claimed proposal failed to attach.
    pub fn release_round(&self, address: &Address) {
        let mut round = self.round_write();
        if *round == Round::Claimed(address.clone()) {
            *round = Round::Open(address.clone());
        }
    }

    /// Known validator, score above the trust floor, and at least one
    /// computation contributed.
    pub fn validate_proposer(&self, address: &Address, contribution: &PocContribution) -> bool {
        self.check_trust(address, contribution).is_ok()
    }

    /// [`validate_proposer`](Self::validate_proposer) plus the leader check,
    /// reporting why a proposer is refused.
    pub fn check_proposer(
        &self,
        address: &Address,
        contribution: &PocContribution,
    ) -> Result<(), ConsensusError> {
        Self::check_round(&self.round_read(), address)?;
        self.check_trust(address, contribution)
    }

    fn check_round(round: &Round, address: &Address) -> Result<(), ConsensusError> {
        match round {
            Round::Open(leader) if leader == address => Ok(()),
            Round::Claimed(leader) if leader == address => {
                Err(ConsensusError::RoundClaimed(address.clone()))
            }
            other => Err(ConsensusError::NotLeader {
                proposer: address.clone(),
                leader: other.leader().cloned(),
            }),
        }
    }

    fn check_trust(
        &self,
        address: &Address,
        contribution: &PocContribution,
    ) -> Result<(), ConsensusError> {
        let score = {
            let validators = self.read();
            let record = validators
                .get(address)
                .ok_or_else(|| ConsensusError::UnknownValidator(address.clone()))?;
            record.reputation.score()
        };
        if score <= TRUST_FLOOR {
            return Err(ConsensusError::BelowTrustFloor {
                address: address.clone(),
                score,
            });
        }
        if contribution.computations == 0 {
            return Err(ConsensusError::NoContribution(address.clone()));
        }
        Ok(())
    }

    pub fn weight(&self, address: &Address) -> Option<f64> {
        self.read().get(address).map(ValidatorRecord::weight)
    }

    pub fn stake(&self, address: &Address) -> Option<TokenAmount> {
        self.read().get(address).map(|v| v.stake)
    }

    pub fn total_weight(&self) -> f64 {
        self.read().values().map(ValidatorRecord::weight).sum()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.read().contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Registered addresses in iteration order.
    pub fn addresses(&self) -> Vec<Address> {
        self.read().keys().cloned().collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<Address, ValidatorRecord>> {
        self.validators.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<Address, ValidatorRecord>> {
        self.validators.write().unwrap_or_else(|e| e.into_inner())
    }

    fn round_read(&self) -> RwLockReadGuard<'_, Round> {
        self.round.read().unwrap_or_else(|e| e.into_inner())
    }

    fn round_write(&self) -> RwLockWriteGuard<'_, Round> {
        self.round.write().unwrap_or_else(|e| e.into_inner())
    }
}
