//! Sealed blocks.

use serde::{Deserialize, Serialize};
use triad_crypto::digest_parts;
use triad_types::{Address, BlockHash, Signature, Timestamp, Transaction};

/// Maximum number of children a block may have.
pub const MAX_CHILDREN: usize = 3;

const BLOCK_DOMAIN: &[u8] = b"triad-block";
const SUBTREE_DOMAIN: &[u8] = b"triad-subtree";

/// A block in the triad tree.
///
/// `hash` is fixed at sealing time. `child_hashes` and `subtree_hash` are
/// maintained by the [`BlockStore`](crate::BlockStore) as children attach.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: Timestamp,
    pub transactions: Vec<Transaction>,
    pub parent_hash: BlockHash,
    pub hash: BlockHash,
    pub child_hashes: [Option<BlockHash>; MAX_CHILDREN],
    pub subtree_hash: BlockHash,
    pub validator: Address,
    /// Proposer signature over `hash`. All zeros when unsigned.
    pub signature: Signature,
}

impl Block {
    /// Build a block and compute its hash. The block starts as a leaf.
    pub fn seal(
        index: u64,
        timestamp: Timestamp,
        transactions: Vec<Transaction>,
        parent_hash: BlockHash,
        validator: Address,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            transactions,
            parent_hash,
            hash: BlockHash::ZERO,
            child_hashes: [None; MAX_CHILDREN],
            subtree_hash: BlockHash::ZERO,
            validator,
            signature: Signature([0u8; 64]),
        };
        block.hash = block.compute_hash();
        block.subtree_hash = subtree_digest(&block.hash, &[None; MAX_CHILDREN]);
        block
    }

    /// Digest of the content fields: index, timestamp, transactions, parent
    /// hash and validator.
    pub fn compute_hash(&self) -> BlockHash {
        let mut header = [0u8; 24];
        header[..8].copy_from_slice(&self.index.to_be_bytes());
        header[8..16].copy_from_slice(&self.timestamp.as_secs().to_be_bytes());
        header[16..].copy_from_slice(&(self.transactions.len() as u64).to_be_bytes());
        let mut body = Vec::new();
        for tx in &self.transactions {
            let bytes = tx.canonical_bytes();
            body.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
            body.extend_from_slice(&bytes);
        }
        let validator = self.validator.as_str().as_bytes();
        let validator_len = (validator.len() as u64).to_be_bytes();
        digest_parts(&[
            BLOCK_DOMAIN,
            &header,
            &body,
            self.parent_hash.as_bytes(),
            &validator_len,
            validator,
        ])
    }

    pub fn child_count(&self) -> usize {
        self.child_hashes.iter().filter(|c| c.is_some()).count()
    }

    pub fn is_genesis(&self) -> bool {
        self.parent_hash.is_zero()
    }
}

/// Digest of a block hash and its children's subtree hashes in slot order.
///
/// Empty slots are encoded explicitly so a child in slot 0 and the same
/// child in slot 1 give different digests.
pub(crate) fn subtree_digest(
    hash: &BlockHash,
    child_subtrees: &[Option<BlockHash>; MAX_CHILDREN],
) -> BlockHash {
    let mut parts: Vec<&[u8]> = vec![SUBTREE_DOMAIN, hash.as_bytes()];
    for slot in child_subtrees {
        match slot {
            Some(h) => {
                parts.push(&[1]);
                parts.push(h.as_bytes());
            }
            None => parts.push(&[0]),
        }
    }
    digest_parts(&parts)
}
