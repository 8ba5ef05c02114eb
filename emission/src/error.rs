use thiserror::Error;
use triad_types::ErrorKind;

#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("reward {0} is not a finite non-negative number")]
    NonFiniteReward(f64),

    #[error("reward {0} exceeds the representable token supply")]
    RewardOverflow(f64),
}

impl EmissionError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}
