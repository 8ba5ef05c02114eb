//! Consensus: choosing who may propose the next block.
//!
//! Every registered account is a validator whose weight is its stake (the
//! account balance) times its reputation score. A leader is drawn at random
//! in proportion to weight, and a proposal is accepted only from the current
//! leader, and only if it is trusted and has contributed work.
//!
//! ## Module overview
//!
//! - [`selector`]: [`ConsensusSelector`], the validator registry and leader draw.
//! - [`validator`]: [`ValidatorRecord`], a validator's stake and shared reputation.
//! - [`random`]: the [`RandomSource`] the draw consumes.
//! - [`error`]: reasons a proposer is untrusted.

pub mod error;
pub mod random;
pub mod selector;
pub mod validator;

pub use error::ConsensusError;
pub use random::{RandomSource, ThreadRandom};
pub use selector::{ConsensusSelector, TRUST_FLOOR};
pub use validator::ValidatorRecord;
