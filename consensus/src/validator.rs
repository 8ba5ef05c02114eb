//! Validator records.

use triad_reputation::SharedReputation;
use triad_types::{Address, TokenAmount};

/// A validator as the registry sees it.
///
/// `stake` mirrors the account balance and is refreshed by the ledger after
/// every balance change. `reputation` is the account's own handle, so score
/// changes show up here without a resync.
#[derive(Clone, Debug)]
pub struct ValidatorRecord {
    pub address: Address,
    pub stake: TokenAmount,
    pub reputation: SharedReputation,
}

impl ValidatorRecord {
    /// Selection weight: `stake × score`.
    pub fn weight(&self) -> f64 {
        self.stake.as_f64() * self.reputation.score()
    }
}
