//! The triad tree: a block store where every block has at most three children.
//!
//! ## Module overview
//!
//! - [`block`]: the sealed block and its canonical digest.
//! - [`node`]: arena nodes with three ordered child slots.
//! - [`store`]: [`BlockStore`], attachment, hash cascading and validation.
//! - [`genesis`]: the deterministic root block of each network.
//! - [`gossip`]: the outbound block propagation boundary.
//! - [`error`]: tree error types.
//!
//! ## Hashes
//!
//! Each block carries two digests. `hash` covers the block's own content and
//! never changes once sealed; children point at it through `parent_hash`.
//! `subtree_hash` covers `hash` plus the subtree hashes of the children in
//! slot order, and is recomputed up to the root on every attachment, so the
//! root's subtree hash commits to the entire tree.

pub mod block;
pub mod error;
pub mod genesis;
pub mod gossip;
pub mod node;
pub mod store;

pub use block::{Block, MAX_CHILDREN};
pub use error::TreeError;
pub use genesis::{create_genesis_block, genesis_hash, GenesisConfig};
pub use gossip::{Gossip, GossipError};
pub use node::{NodeId, TriadNode};
pub use store::BlockStore;
