use proptest::prelude::*;
use std::sync::Arc;

use triad_node::{Node, NodeConfig, NodeServices};
use triad_nullables::{AcceptAllVerifier, NullClock, NullGossip, NullRandom, NullStore};
use triad_types::{Address, DeviceId, PocContribution, Signature, TokenAmount};

const ACCOUNTS: usize = 3;

fn node_on(store: Arc<NullStore>) -> Node {
    Node::new(
        NodeConfig::default(),
        NodeServices {
            store,
            gossip: Arc::new(NullGossip::new()),
            verifier: Arc::new(AcceptAllVerifier),
            random: Arc::new(NullRandom::constant(0.0)),
            clock: Arc::new(NullClock::new(1_000)),
        },
    )
    .unwrap()
}

fn name(i: usize) -> Address {
    Address::new(format!("acct{i}"))
}

#[derive(Clone, Debug)]
enum Op {
    Transfer { from: usize, to: usize, amount: u64, nonce: u64 },
    Contribute { who: usize, computations: u64, uptime: u64 },
    Propose { who: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ACCOUNTS, 0..ACCOUNTS, 0u64..600, 0u64..20)
            .prop_map(|(from, to, amount, nonce)| Op::Transfer { from, to, amount, nonce }),
        (0..ACCOUNTS, 0u64..200_000, 0u64..50)
            .prop_map(|(who, computations, uptime)| Op::Contribute { who, computations, uptime }),
        (0..ACCOUNTS).prop_map(|who| Op::Propose { who }),
    ]
}

proptest! {
    /// Whatever succeeds or fails, a node restarted on the same store sees
    /// identical accounts and an identical tree.
    #[test]
    fn restart_reproduces_state(ops in prop::collection::vec(op(), 0..40)) {
        let store = Arc::new(NullStore::new());
        let node = node_on(store.clone());
        for i in 0..ACCOUNTS {
            node.register(name(i), DeviceId::new("rig")).unwrap();
        }
        for op in ops {
            match op {
                Op::Transfer { from, to, amount, nonce } => {
                    let _ = node.transfer(
                        &name(from),
                        &name(to),
                        TokenAmount::new(amount),
                        nonce,
                        &Signature([0u8; 64]),
                    );
                }
                Op::Contribute { who, computations, uptime } => {
                    let report = PocContribution { computations, uptime, ..Default::default() };
                    node.contribute(&name(who), &DeviceId::new("rig"), &report).unwrap();
                }
                Op::Propose { who } => {
                    let _ = node.propose_block(&node.latest_block_hash(), Vec::new(), name(who));
                }
            }
        }
        prop_assert!(node.validate_tree());

        let restarted = node_on(store);
        prop_assert_eq!(restarted.block_count(), node.block_count());
        prop_assert_eq!(restarted.tree_digest(), node.tree_digest());
        prop_assert_eq!(restarted.ledger().snapshots(), node.ledger().snapshots());
        prop_assert_eq!(restarted.ledger().total_supply(), node.ledger().total_supply());
    }
}
