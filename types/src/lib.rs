//! Fundamental types for the Triad ledger.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses, device identifiers, block hashes, token amounts, timestamps,
//! contribution reports, transactions, and the cross-crate error taxonomy.

pub mod address;
pub mod amount;
pub mod block;
pub mod contribution;
pub mod error;
pub mod keys;
pub mod network;
pub mod time;
pub mod transaction;

pub use address::{Address, DeviceId};
pub use amount::TokenAmount;
pub use block::BlockHash;
pub use contribution::PocContribution;
pub use error::{ErrorKind, TypesError};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use time::{Clock, SystemClock, Timestamp};
pub use transaction::Transaction;
