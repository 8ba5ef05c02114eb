use thiserror::Error;
use triad_types::ErrorKind;

#[derive(Debug, Error)]
pub enum ReputationError {
    #[error("invalid contribution report: {0}")]
    InvalidReport(String),
}

impl ReputationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidReport(_) => ErrorKind::InvalidInput,
        }
    }
}
