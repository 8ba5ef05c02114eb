use serde::{Deserialize, Serialize};
use triad_types::TokenAmount;

/// Balance every new account starts with.
pub const DEFAULT_STARTING_BALANCE: TokenAmount = TokenAmount::new(1000);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    pub starting_balance: TokenAmount,
    /// When set, registering an existing address resets it to a fresh
    /// account instead of failing.
    pub allow_reregistration: bool,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_STARTING_BALANCE,
            allow_reregistration: false,
        }
    }
}
