use thiserror::Error;
use triad_emission::EmissionError;
use triad_reputation::ReputationError;
use triad_types::{Address, DeviceId, ErrorKind, TokenAmount};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("account {0} is already registered")]
    AlreadyRegistered(Address),

    #[error("account not found: {0}")]
    UnknownAccount(Address),

    #[error("device {device} is not registered to {address}")]
    DeviceNotFound { address: Address, device: DeviceId },

    #[error("device {device} is already registered to {address}")]
    DuplicateDevice { address: Address, device: DeviceId },

    #[error("insufficient balance in {address}: have {balance}, need {requested}")]
    InsufficientBalance {
        address: Address,
        balance: TokenAmount,
        requested: TokenAmount,
    },

    #[error("stale nonce for {address}: {nonce} is not above {last_nonce}")]
    StaleNonce {
        address: Address,
        nonce: u64,
        last_nonce: u64,
    },

    #[error("{0} cannot transfer to itself")]
    SelfTransfer(Address),

    #[error("balance of {0} would overflow")]
    BalanceOverflow(Address),

    #[error("invalid contribution: {0}")]
    InvalidContribution(#[from] ReputationError),

    #[error("emission failed: {0}")]
    Emission(#[from] EmissionError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAccount(_) | Self::DeviceNotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyRegistered(_) | Self::DuplicateDevice { .. } => ErrorKind::Conflict,
            Self::InsufficientBalance { .. }
            | Self::StaleNonce { .. }
            | Self::SelfTransfer(_)
            | Self::BalanceOverflow(_) => ErrorKind::InvalidInput,
            Self::InvalidContribution(e) => e.kind(),
            Self::Emission(e) => e.kind(),
        }
    }
}
