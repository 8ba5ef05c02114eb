//! Blake2b-256 digests.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use triad_types::BlockHash;

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Digest a sequence of parts into a [`BlockHash`].
pub fn digest_parts(parts: &[&[u8]]) -> BlockHash {
    BlockHash::new(blake2b_256_multi(parts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(blake2b_256(b"triad"), blake2b_256(b"triad"));
        assert_ne!(blake2b_256(b"triad"), blake2b_256(b"tree"));
    }

    #[test]
    fn empty_input_is_not_zero() {
        assert_ne!(blake2b_256(b""), [0u8; 32]);
    }

    #[test]
    fn multi_matches_concatenation() {
        let single = blake2b_256(b"parentchild");
        let multi = blake2b_256_multi(&[b"parent", b"child"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn digest_parts_wraps_block_hash() {
        let h = digest_parts(&[b"genesis"]);
        assert_eq!(h.as_bytes(), &blake2b_256(b"genesis"));
        assert!(!h.is_zero());
    }
}
