//! Transfer transactions carried inside blocks.

use crate::{Address, BlockHash, NetworkId, Signature, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};

const SIGNING_DOMAIN: &[u8] = b"triad-transfer";

/// A value transfer between two accounts.
///
/// `prev_hash` references the latest block known to the node when the
/// transfer was accepted. The signature covers [`transfer_signing_bytes`]
/// only, so the node can stamp `timestamp` and `prev_hash` after verifying.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: Address,
    pub recipient: Address,
    pub amount: TokenAmount,
    pub timestamp: Timestamp,
    pub nonce: u64,
    pub prev_hash: BlockHash,
    pub signature: Signature,
}

impl Transaction {
    /// What the sender signed, bound to `network`.
    pub fn signing_bytes(&self, network: NetworkId) -> Vec<u8> {
        transfer_signing_bytes(network, &self.sender, &self.recipient, self.amount, self.nonce)
    }

    /// Canonical byte encoding of the whole transaction, used when hashing blocks.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = transfer_body(&self.sender, &self.recipient, self.amount, self.nonce);
        buf.extend_from_slice(&self.timestamp.as_secs().to_be_bytes());
        buf.extend_from_slice(self.prev_hash.as_bytes());
        buf.extend_from_slice(self.signature.as_bytes());
        buf
    }
}

/// The bytes a sender signs to authorize a transfer on `network`.
///
/// The network name is part of the message, so a signature made for one
/// network does not verify on another.
pub fn transfer_signing_bytes(
    network: NetworkId,
    from: &Address,
    to: &Address,
    amount: TokenAmount,
    nonce: u64,
) -> Vec<u8> {
    let tag = network.as_str();
    let mut buf = Vec::with_capacity(SIGNING_DOMAIN.len() + 4 + tag.len());
    buf.extend_from_slice(SIGNING_DOMAIN);
    buf.extend_from_slice(&(tag.len() as u32).to_be_bytes());
    buf.extend_from_slice(tag.as_bytes());
    buf.extend_from_slice(&transfer_body(from, to, amount, nonce));
    buf
}

/// Identifiers are length-prefixed so `("ab", "c")` and `("a", "bc")` differ.
fn transfer_body(from: &Address, to: &Address, amount: TokenAmount, nonce: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + from.as_str().len() + to.as_str().len() + 16);
    for id in [from.as_str(), to.as_str()] {
        buf.extend_from_slice(&(id.len() as u32).to_be_bytes());
        buf.extend_from_slice(id.as_bytes());
    }
    buf.extend_from_slice(&amount.raw().to_be_bytes());
    buf.extend_from_slice(&nonce.to_be_bytes());
    buf
}
