use proptest::prelude::*;

use triad_tree::{BlockStore, GenesisConfig, TreeError, MAX_CHILDREN};
use triad_types::{Address, NetworkId, Timestamp};

fn store() -> BlockStore {
    BlockStore::create_genesis(&GenesisConfig::for_network(NetworkId::Dev))
}

proptest! {
    /// Any sequence of appends under existing parents keeps the tree valid,
    /// and every rejection is a full parent.
    #[test]
    fn random_appends_keep_tree_valid(choices in prop::collection::vec(any::<prop::sample::Index>(), 1..120)) {
        let mut s = store();
        let mut hashes = vec![s.root().hash];
        for (i, choice) in choices.into_iter().enumerate() {
            let parent = hashes[choice.index(hashes.len())];
            match s.append_block(&parent, vec![], Address::new("v"), Timestamp::new(i as u64)) {
                Ok(h) => hashes.push(h),
                Err(TreeError::ChildSlotsExhausted(p)) => {
                    prop_assert_eq!(p, parent);
                    prop_assert_eq!(s.children(&parent).unwrap().len(), MAX_CHILDREN);
                }
                Err(e) => prop_assert!(false, "unexpected error {}", e),
            }
        }
        prop_assert_eq!(s.len(), hashes.len());
        prop_assert!(s.validate());
        for block in s.blocks() {
            prop_assert!(block.child_count() <= MAX_CHILDREN);
            if let Some(parent) = s.get(&block.parent_hash) {
                prop_assert_eq!(block.index, parent.index + 1);
            }
        }
    }

    /// Replaying blocks in insertion order reproduces the root subtree hash.
    #[test]
    fn replay_reproduces_root(choices in prop::collection::vec(any::<prop::sample::Index>(), 1..60)) {
        let mut s = store();
        let mut hashes = vec![s.root().hash];
        for (i, choice) in choices.into_iter().enumerate() {
            let parent = hashes[choice.index(hashes.len())];
            if let Ok(h) = s.append_block(&parent, vec![], Address::new("v"), Timestamp::new(i as u64)) {
                hashes.push(h);
            }
        }
        let mut replica = store();
        for block in s.blocks().skip(1) {
            replica.import_block(block.clone()).unwrap();
        }
        prop_assert_eq!(replica.root().subtree_hash, s.root().subtree_hash);
    }

    /// Blocks survive a bincode round trip with their hash intact.
    #[test]
    fn block_bincode_keeps_hash(ts in any::<u64>()) {
        let mut s = store();
        let root = s.root().hash;
        let h = s.append_block(&root, vec![], Address::new("v"), Timestamp::new(ts)).unwrap();
        let block = s.get(&h).unwrap();
        let bytes = bincode::serialize(block).unwrap();
        let back: triad_tree::Block = bincode::deserialize(&bytes).unwrap();
        prop_assert_eq!(back.compute_hash(), h);
    }
}
