//! Signature verification capability.

use crate::keys::public_key_of;
use crate::sign::verify_signature;
use triad_types::{Address, Signature};

/// Checks that `signer` authorized `message`.
///
/// The node holds one of these behind an `Arc<dyn SignatureVerifier>` and
/// calls it before any transfer reaches the ledger.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, signer: &Address, message: &[u8], signature: &Signature) -> bool;
}

/// Ed25519 verification where each address is the hex of its public key.
///
/// Addresses that do not decode to a 32-byte key never verify.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, signer: &Address, message: &[u8], signature: &Signature) -> bool {
        match public_key_of(signer) {
            Some(public) => verify_signature(message, signature, &public),
            None => false,
        }
    }
}
