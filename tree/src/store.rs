//! The block store.
//!
//! Nodes live in an append-only arena. A hash index maps every block hash to
//! its node, and upward walks follow `parent_hash` through that index, so no
//! node holds a back-pointer.

use crate::block::{subtree_digest, Block, MAX_CHILDREN};
use crate::error::TreeError;
use crate::genesis::{create_genesis_block, GenesisConfig};
use crate::node::{NodeId, TriadNode};
use std::collections::HashMap;
use triad_types::{Address, BlockHash, NetworkId, Timestamp, Transaction};

const ROOT: NodeId = NodeId(0);

#[derive(Clone, Debug)]
pub struct BlockStore {
    network: NetworkId,
    nodes: Vec<TriadNode>,
    index: HashMap<BlockHash, NodeId>,
    latest: NodeId,
}

impl BlockStore {
    /// A tree holding only the network's genesis block.
    pub fn create_genesis(config: &GenesisConfig) -> Self {
        let genesis = create_genesis_block(config);
        let mut index = HashMap::new();
        index.insert(genesis.hash, ROOT);
        Self {
            network: config.network,
            nodes: vec![TriadNode::new(genesis)],
            index,
            latest: ROOT,
        }
    }

    pub fn network(&self) -> NetworkId {
        self.network
    }

    /// Seal a new block under `parent_hash` and attach it in the parent's
    /// first free slot. Returns the new block's hash.
    pub fn append_block(
        &mut self,
        parent_hash: &BlockHash,
        transactions: Vec<Transaction>,
        validator: Address,
        timestamp: Timestamp,
    ) -> Result<BlockHash, TreeError> {
        let parent_id = self.slot_parent(parent_hash)?;
        let parent_index = self.nodes[parent_id.0].block.index;
        let block = Block::seal(parent_index + 1, timestamp, transactions, *parent_hash, validator);
        if self.index.contains_key(&block.hash) {
            return Err(TreeError::DuplicateBlock(block.hash));
        }
        Ok(self.attach(parent_id, block))
    }

    /// Attach a block sealed elsewhere (gossip or persistence).
    ///
    /// The content hash must match and the index must follow the parent's.
    /// Derived fields (`child_hashes`, `subtree_hash`) are recomputed.
    pub fn import_block(&mut self, mut block: Block) -> Result<BlockHash, TreeError> {
        let computed = block.compute_hash();
        if computed != block.hash {
            return Err(TreeError::HashMismatch {
                claimed: block.hash,
                computed,
            });
        }
        if self.index.contains_key(&block.hash) {
            return Err(TreeError::DuplicateBlock(block.hash));
        }
        let parent_id = self.slot_parent(&block.parent_hash)?;
        let expected = self.nodes[parent_id.0].block.index + 1;
        if block.index != expected {
            return Err(TreeError::InvalidIndex {
                expected,
                actual: block.index,
            });
        }
        block.child_hashes = [None; MAX_CHILDREN];
        block.subtree_hash = subtree_digest(&block.hash, &[None; MAX_CHILDREN]);
        Ok(self.attach(parent_id, block))
    }

    /// Resolve a parent that still has a free slot.
    fn slot_parent(&self, parent_hash: &BlockHash) -> Result<NodeId, TreeError> {
        let parent_id = *self
            .index
            .get(parent_hash)
            .ok_or(TreeError::ParentNotFound(*parent_hash))?;
        if self.nodes[parent_id.0].free_slot().is_none() {
            return Err(TreeError::ChildSlotsExhausted(*parent_hash));
        }
        Ok(parent_id)
    }

    /// Caller has checked the parent has a free slot.
    fn attach(&mut self, parent_id: NodeId, block: Block) -> BlockHash {
        let hash = block.hash;
        let id = NodeId(self.nodes.len());
        self.nodes.push(TriadNode::new(block));
        self.index.insert(hash, id);

        let parent = &mut self.nodes[parent_id.0];
        if let Some(slot) = parent.free_slot() {
            parent.children[slot] = Some(id);
            parent.block.child_hashes[slot] = Some(hash);
        }
        self.latest = id;
        self.refresh_subtree_hashes(parent_id);
        tracing::debug!(%hash, index = self.nodes[id.0].block.index, "block attached");
        hash
    }

    /// Recompute subtree hashes from `start` up to the root.
    fn refresh_subtree_hashes(&mut self, start: NodeId) {
        let mut current = Some(start);
        while let Some(id) = current {
            let node = &self.nodes[id.0];
            let subtree = subtree_digest(&node.block.hash, &self.child_subtrees(node));
            let parent_hash = node.block.parent_hash;
            self.nodes[id.0].block.subtree_hash = subtree;
            current = if parent_hash.is_zero() {
                None
            } else {
                self.index.get(&parent_hash).copied()
            };
        }
    }

    fn child_subtrees(&self, node: &TriadNode) -> [Option<BlockHash>; MAX_CHILDREN] {
        let mut out = [None; MAX_CHILDREN];
        for (slot, child) in node.children.iter().enumerate() {
            out[slot] = child.map(|c| self.nodes[c.0].block.subtree_hash);
        }
        out
    }

    /// Whether every stored hash and link is consistent.
    pub fn validate(&self) -> bool {
        self.verify().is_ok()
    }

    /// Check the whole tree, stopping at the first inconsistency.
    ///
    /// Structure and content hashes are checked top-down with a worklist;
    /// subtree hashes are then recomputed bottom-up in reverse arena order.
    pub fn verify(&self) -> Result<(), TreeError> {
        let root = &self.nodes[ROOT.0].block;
        if !root.parent_hash.is_zero() {
            return Err(integrity(root.hash, "root has a parent"));
        }

        let mut visited = 0usize;
        let mut worklist = vec![ROOT];
        while let Some(id) = worklist.pop() {
            visited += 1;
            let node = &self.nodes[id.0];
            let block = &node.block;
            if block.compute_hash() != block.hash {
                return Err(integrity(block.hash, "content does not match hash"));
            }
            if self.index.get(&block.hash) != Some(&id) {
                return Err(integrity(block.hash, "hash index out of sync"));
            }
            for slot in 0..MAX_CHILDREN {
                match (node.children[slot], block.child_hashes[slot]) {
                    (None, None) => {}
                    (Some(child_id), Some(recorded)) => {
                        let child = &self.nodes[child_id.0].block;
                        if child.hash != recorded {
                            return Err(integrity(block.hash, "child hash does not match child"));
                        }
                        if child.parent_hash != block.hash {
                            return Err(integrity(child.hash, "parent hash does not match parent"));
                        }
                        if child.index != block.index + 1 {
                            return Err(integrity(child.hash, "index does not follow parent"));
                        }
                        worklist.push(child_id);
                    }
                    _ => return Err(integrity(block.hash, "child slots out of sync")),
                }
            }
        }
        if visited != self.nodes.len() || self.index.len() != self.nodes.len() {
            return Err(integrity(root.hash, "unreachable or unindexed blocks"));
        }

        let mut expected = vec![BlockHash::ZERO; self.nodes.len()];
        for id in (0..self.nodes.len()).rev() {
            let node = &self.nodes[id];
            let mut subtrees = [None; MAX_CHILDREN];
            for (slot, child) in node.children.iter().enumerate() {
                subtrees[slot] = child.map(|c| expected[c.0]);
            }
            expected[id] = subtree_digest(&node.block.hash, &subtrees);
            if expected[id] != node.block.subtree_hash {
                return Err(integrity(node.block.hash, "subtree hash mismatch"));
            }
        }
        Ok(())
    }

    pub fn get(&self, hash: &BlockHash) -> Option<&Block> {
        self.index.get(hash).map(|id| &self.nodes[id.0].block)
    }

    pub fn contains(&self, hash: &BlockHash) -> bool {
        self.index.contains_key(hash)
    }

    /// Mutable access to a stored block. Nothing is re-hashed; a changed
    /// hashed field shows up as an integrity failure on the next validation.
    pub fn block_mut(&mut self, hash: &BlockHash) -> Option<&mut Block> {
        let id = *self.index.get(hash)?;
        Some(&mut self.nodes[id.0].block)
    }

    pub fn root(&self) -> &Block {
        &self.nodes[ROOT.0].block
    }

    /// The most recently attached block (the root in a fresh tree).
    pub fn latest(&self) -> &Block {
        &self.nodes[self.latest.0].block
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a store holds at least its genesis block.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Hashes of a block's children in slot order.
    pub fn children(&self, hash: &BlockHash) -> Option<Vec<BlockHash>> {
        let id = self.index.get(hash)?;
        let node = &self.nodes[id.0];
        Some(node.children().map(|c| self.nodes[c.0].block.hash).collect())
    }

    /// Largest block index in the tree.
    pub fn height(&self) -> u64 {
        self.nodes.iter().map(|n| n.block.index).max().unwrap_or(0)
    }

    /// All blocks, parents before children.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.nodes.iter().map(|n| &n.block)
    }
}

fn integrity(hash: BlockHash, reason: &str) -> TreeError {
    TreeError::IntegrityFailure {
        hash,
        reason: reason.to_string(),
    }
}
