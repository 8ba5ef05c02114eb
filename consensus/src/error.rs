use thiserror::Error;
use triad_types::{Address, ErrorKind};

#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("{proposer} is not the current leader (leader: {leader:?})")]
    NotLeader {
        proposer: Address,
        leader: Option<Address>,
    },

    #[error("validator {0} not found")]
    UnknownValidator(Address),

    #[error("validator {address} reputation {score} is at or below the trust floor")]
    BelowTrustFloor { address: Address, score: f64 },

    #[error("validator {0} has no recorded computations")]
    NoContribution(Address),

    #[error("round led by {0} already has a proposal in flight")]
    RoundClaimed(Address),
}

impl ConsensusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoundClaimed(_) => ErrorKind::Conflict,
            _ => ErrorKind::Untrusted,
        }
    }
}
