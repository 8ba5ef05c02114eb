use thiserror::Error;
use triad_types::{Address, ErrorKind};

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] triad_ledger::LedgerError),

    #[error("tree error: {0}")]
    Tree(#[from] triad_tree::TreeError),

    #[error("consensus error: {0}")]
    Consensus(#[from] triad_consensus::ConsensusError),

    #[error("store error: {0}")]
    Store(#[from] triad_store::StoreError),

    #[error("gossip error: {0}")]
    Gossip(#[from] triad_tree::GossipError),

    #[error("invalid identifier: {0}")]
    Types(#[from] triad_types::TypesError),

    #[error("signature from {signer} is invalid")]
    InvalidSignature { signer: Address },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(e) => e.kind(),
            Self::Tree(e) => e.kind(),
            Self::Consensus(e) => e.kind(),
            Self::Store(e) => e.kind(),
            Self::Gossip(e) => e.kind(),
            Self::Types(e) => e.kind(),
            Self::InvalidSignature { .. } => ErrorKind::Untrusted,
            Self::InvalidRequest(_) | Self::Config(_) => ErrorKind::InvalidInput,
            Self::Metrics(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }
}
