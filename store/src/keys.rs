//! Key layout.
//!
//! | Record      | Key                                   |
//! |-------------|---------------------------------------|
//! | account     | `account/<address>`                   |
//! | device      | `device/<address>/<device>`           |
//! | transaction | `tx/<from>/<nonce, 20 digits>`        |
//! | block       | `block/<hash hex>`                    |
//!
//! Identifiers cannot contain `/`, so prefixes never collide. Nonces are
//! zero-padded so lexical order is numeric order.

use triad_types::{Address, BlockHash, DeviceId};

pub const ACCOUNT_PREFIX: &str = "account/";
pub const DEVICE_PREFIX: &str = "device/";
pub const TX_PREFIX: &str = "tx/";
pub const BLOCK_PREFIX: &str = "block/";

pub fn account(address: &Address) -> String {
    format!("{ACCOUNT_PREFIX}{address}")
}

pub fn device(address: &Address, device: &DeviceId) -> String {
    format!("{DEVICE_PREFIX}{address}/{device}")
}

/// Prefix covering every device of one account.
pub fn devices_of(address: &Address) -> String {
    format!("{DEVICE_PREFIX}{address}/")
}

pub fn transaction(from: &Address, nonce: u64) -> String {
    format!("{TX_PREFIX}{from}/{nonce:020}")
}

/// Prefix covering every transaction sent by one account.
pub fn transactions_of(from: &Address) -> String {
    format!("{TX_PREFIX}{from}/")
}

pub fn block(hash: &BlockHash) -> String {
    format!("{BLOCK_PREFIX}{hash}")
}
