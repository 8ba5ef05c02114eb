//! In-process collaborators for a standalone daemon.
//!
//! The peer transport is deployed separately; until one is attached the
//! daemon only logs broadcasts.

use triad_tree::{Block, Gossip, GossipError};

/// Gossip that only records the broadcast in the log.
pub struct LogGossip;

impl Gossip for LogGossip {
    fn broadcast(&self, block: &Block) -> Result<(), GossipError> {
        tracing::debug!(hash = %block.hash, index = block.index, "block ready for broadcast");
        Ok(())
    }
}
