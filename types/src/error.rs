//! Error taxonomy shared across crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse classification every crate-level error maps into.
///
/// Collaborators (transport, gossip) use this to pick a status code or
/// decide whether a resubmission can ever succeed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown account, device, or parent block.
    NotFound,
    /// Duplicate registration, duplicate device, exhausted child slots.
    Conflict,
    /// Stale nonce, insufficient balance, malformed or oversized values.
    InvalidInput,
    /// Reputation below the trust floor, failed proposer validation, bad signature.
    Untrusted,
    /// Stored tree data does not match its hashes.
    IntegrityFailure,
    /// Backend or infrastructure failure outside the core.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::InvalidInput => "invalid_input",
            Self::Untrusted => "untrusted",
            Self::IntegrityFailure => "integrity_failure",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while validating primitive values.
#[derive(Debug, Error)]
pub enum TypesError {
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    #[error("identifier is {len} bytes, maximum is {max}")]
    IdentifierTooLong { len: usize, max: usize },

    #[error("identifier contains a forbidden character: {0:?}")]
    InvalidIdentifier(String),

    #[error("invalid block hash: {0}")]
    InvalidHash(String),
}

impl TypesError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}
