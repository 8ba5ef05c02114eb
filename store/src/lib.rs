//! Persistence boundary for the Triad ledger.
//!
//! The node writes accounts, devices, transactions and blocks through the
//! [`KvStore`] trait and never touches a backend directly. Any ordered
//! key-value store (LMDB, RocksDB, an in-memory map for tests) can sit
//! behind it.

pub mod codec;
pub mod error;
pub mod keys;
pub mod memory;

pub use codec::{decode, encode, get_record, load_prefix, put_record};
pub use error::StoreError;
pub use memory::MemoryStore;

/// An ordered byte-keyed store.
///
/// Keys are UTF-8 paths built by [`keys`]. `iterate_prefix` returns entries
/// in ascending key order.
pub trait KvStore: Send + Sync {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Fails with [`StoreError::NotFound`] for a missing key.
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    fn iterate_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError>;
}
