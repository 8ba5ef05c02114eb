//! Block propagation boundary.
//!
//! The peer-to-peer transport lives outside this workspace. The node hands
//! every accepted block to a [`Gossip`] implementation and imports inbound
//! blocks through its own `receive_block`.

use crate::block::Block;
use thiserror::Error;
use triad_types::ErrorKind;

#[derive(Debug, Error)]
pub enum GossipError {
    #[error("gossip transport unavailable: {0}")]
    Unavailable(String),
}

impl GossipError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Internal
    }
}

pub trait Gossip: Send + Sync {
    fn broadcast(&self, block: &Block) -> Result<(), GossipError>;
}
