//! Cryptographic primitives for the Triad ledger.
//!
//! - **Blake2b-256** for block and subtree digests
//! - **Ed25519** for account keys and transfer signatures
//! - [`SignatureVerifier`], the capability the node uses to check transfer
//!   authorization without knowing which scheme is in play

pub mod hash;
pub mod keys;
pub mod sign;
pub mod verifier;

pub use hash::{blake2b_256, blake2b_256_multi, digest_parts};
pub use keys::{address_of, generate_keypair, keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature};
pub use verifier::{Ed25519Verifier, SignatureVerifier};
