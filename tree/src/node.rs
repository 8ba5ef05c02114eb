//! Arena nodes.

use crate::block::{Block, MAX_CHILDREN};

/// Position of a node in the [`BlockStore`](crate::BlockStore) arena.
///
/// Nodes are only ever appended, so a child's id is always greater than its
/// parent's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One block plus up to three ordered child references.
#[derive(Clone, Debug)]
pub struct TriadNode {
    pub block: Block,
    pub(crate) children: [Option<NodeId>; MAX_CHILDREN],
}

impl TriadNode {
    pub(crate) fn new(block: Block) -> Self {
        Self {
            block,
            children: [None; MAX_CHILDREN],
        }
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().flatten().copied()
    }

    pub fn child_count(&self) -> usize {
        self.children.iter().filter(|c| c.is_some()).count()
    }

    /// First empty slot, if any.
    pub fn free_slot(&self) -> Option<usize> {
        self.children.iter().position(|c| c.is_none())
    }
}
