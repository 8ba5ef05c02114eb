use proptest::prelude::*;

use triad_types::{Address, BlockHash, Signature, Timestamp, TokenAmount};

proptest! {
    /// BlockHash::is_zero is true only for all-zero bytes.
    #[test]
    fn block_hash_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        prop_assert_eq!(hash.is_zero(), bytes == [0u8; 32]);
    }

    /// Display output parses back to the same hash.
    #[test]
    fn block_hash_display_parses(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        let parsed: BlockHash = hash.to_string().parse().unwrap();
        prop_assert_eq!(parsed, hash);
    }

    /// Timestamp ordering matches the underlying seconds.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        prop_assert_eq!(Timestamp::new(a) <= Timestamp::new(b), a <= b);
    }

    /// checked_add never wraps.
    #[test]
    fn amount_checked_add(a in any::<u64>(), b in any::<u64>()) {
        let sum = TokenAmount::new(a).checked_add(TokenAmount::new(b));
        prop_assert_eq!(sum.map(|s| s.raw()), a.checked_add(b));
    }

    /// checked_sub fails exactly when the subtrahend is larger.
    #[test]
    fn amount_checked_sub(a in any::<u64>(), b in any::<u64>()) {
        let diff = TokenAmount::new(a).checked_sub(TokenAmount::new(b));
        prop_assert_eq!(diff.is_none(), b > a);
    }

    /// Identifiers made of safe characters always parse and keep their text.
    #[test]
    fn address_accepts_safe_identifiers(s in "[a-zA-Z0-9_.-]{1,64}") {
        let addr = Address::parse(&s).unwrap();
        prop_assert_eq!(addr.as_str(), s.as_str());
    }

    /// Signatures survive a JSON round trip as hex.
    #[test]
    fn signature_json_hex(bytes in prop::collection::vec(any::<u8>(), 64)) {
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        let sig = Signature(arr);
        let json = serde_json::to_string(&sig).unwrap();
        prop_assert_eq!(json.trim_matches('"').len(), 128);
        let back: Signature = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, sig);
    }

    /// Bincode keeps raw bytes for signatures.
    #[test]
    fn signature_bincode(bytes in prop::collection::vec(any::<u8>(), 64)) {
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        let sig = Signature(arr);
        let encoded = bincode::serialize(&sig).unwrap();
        let back: Signature = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(back, sig);
    }
}
