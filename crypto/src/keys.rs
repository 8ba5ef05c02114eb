//! Ed25519 key generation and address derivation.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use triad_types::{Address, KeyPair, PrivateKey, PublicKey};

/// Generate a new Ed25519 key pair from a secure random source.
pub fn generate_keypair() -> KeyPair {
    let signing_key = SigningKey::generate(&mut OsRng);
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let signing_key = SigningKey::from_bytes(&private.0);
    PublicKey(signing_key.verifying_key().to_bytes())
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let private = PrivateKey(*seed);
    let public = public_from_private(&private);
    KeyPair { public, private }
}

/// The account address owned by a public key: its lowercase hex encoding.
pub fn address_of(public: &PublicKey) -> Address {
    Address::new(public.to_hex())
}

/// Recover the public key an address encodes, if it is one.
pub(crate) fn public_key_of(address: &Address) -> Option<PublicKey> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(address.as_str(), &mut bytes).ok()?;
    Some(PublicKey(bytes))
}
