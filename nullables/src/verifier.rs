//! Nullable signature verifier.

use triad_crypto::SignatureVerifier;
use triad_types::{Address, Signature};

/// Accepts every signature. For tests that use plain-name addresses.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAllVerifier;

impl SignatureVerifier for AcceptAllVerifier {
    fn verify(&self, _signer: &Address, _message: &[u8], _signature: &Signature) -> bool {
        true
    }
}
