//! The Triad account ledger.
//!
//! [`LedgerState`] owns every account behind one coarse lock and keeps the
//! consensus validator table in step with balances. Contribution credit runs
//! the full pipeline: audit, reward at the pre-report score, reputation
//! update, balance credit, eco counters, validator resync.
//!
//! ## Module overview
//!
//! - [`state`]: [`LedgerState`] and its operations.
//! - [`account`]: the live [`Account`] and its serializable [`AccountSnapshot`].
//! - [`params`]: [`LedgerParams`].
//! - [`error`]: [`LedgerError`].

pub mod account;
pub mod error;
pub mod params;
pub mod state;

pub use account::{Account, AccountSnapshot};
pub use error::LedgerError;
pub use params::LedgerParams;
pub use state::{ContributionReceipt, LedgerState, TransferReceipt};
