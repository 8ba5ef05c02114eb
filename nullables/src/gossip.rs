//! Nullable gossip: record broadcasts without sending them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use triad_tree::{Block, Gossip, GossipError};
use triad_types::BlockHash;

#[derive(Default)]
pub struct NullGossip {
    sent: Mutex<Vec<Block>>,
    offline: AtomicBool,
}

impl NullGossip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every broadcast fail.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// All blocks broadcast so far (for assertions).
    pub fn sent(&self) -> Vec<Block> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn sent_hashes(&self) -> Vec<BlockHash> {
        self.sent().into_iter().map(|b| b.hash).collect()
    }
}

impl Gossip for NullGossip {
    fn broadcast(&self, block: &Block) -> Result<(), GossipError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(GossipError::Unavailable("offline".into()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(block.clone());
        Ok(())
    }
}
