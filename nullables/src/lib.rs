//! Deterministic stand-ins for the node's collaborators.
//!
//! The node reaches its clock, randomness, store, gossip transport and
//! signature checker only through traits. The types here implement those
//! traits in memory with knobs the tests turn: a clock that moves on
//! request, preset random draws, a store whose writes can be made to fail,
//! a gossip sink that records or refuses broadcasts, and a verifier that
//! accepts everything.

pub mod clock;
pub mod gossip;
pub mod random;
pub mod store;
pub mod verifier;

pub use clock::NullClock;
pub use gossip::NullGossip;
pub use random::NullRandom;
pub use store::NullStore;
pub use verifier::AcceptAllVerifier;
