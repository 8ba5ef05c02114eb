use thiserror::Error;
use triad_types::{BlockHash, ErrorKind};

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("parent block {0} not found")]
    ParentNotFound(BlockHash),

    #[error("block {0} already has the maximum number of children")]
    ChildSlotsExhausted(BlockHash),

    #[error("block {0} is already in the tree")]
    DuplicateBlock(BlockHash),

    #[error("block hash mismatch: claimed {claimed}, computed {computed}")]
    HashMismatch {
        claimed: BlockHash,
        computed: BlockHash,
    },

    #[error("block index {actual} does not follow parent index (expected {expected})")]
    InvalidIndex { expected: u64, actual: u64 },

    #[error("integrity failure at block {hash}: {reason}")]
    IntegrityFailure { hash: BlockHash, reason: String },
}

impl TreeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ParentNotFound(_) => ErrorKind::NotFound,
            Self::ChildSlotsExhausted(_) | Self::DuplicateBlock(_) => ErrorKind::Conflict,
            Self::HashMismatch { .. } | Self::InvalidIndex { .. } => ErrorKind::InvalidInput,
            Self::IntegrityFailure { .. } => ErrorKind::IntegrityFailure,
        }
    }
}
