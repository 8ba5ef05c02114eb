//! Genesis block creation.
//!
//! The genesis block is the root of the triad tree. It has no transactions,
//! `parent_hash: BlockHash::ZERO`, and differs per `NetworkId` so each network
//! has its own deterministic genesis hash.

use crate::block::Block;
use triad_types::{Address, BlockHash, NetworkId, Timestamp};

/// Configuration for creating a genesis block.
#[derive(Clone, Debug)]
pub struct GenesisConfig {
    pub network: NetworkId,
    /// Validator recorded on the genesis block. Defaults per network.
    pub validator: Address,
}

impl GenesisConfig {
    pub fn for_network(network: NetworkId) -> Self {
        Self {
            network,
            validator: genesis_validator(&network),
        }
    }
}

pub fn create_genesis_block(config: &GenesisConfig) -> Block {
    Block::seal(
        0,
        genesis_timestamp(&config.network),
        Vec::new(),
        BlockHash::ZERO,
        config.validator.clone(),
    )
}

/// The deterministic genesis hash of a network with its default validator.
pub fn genesis_hash(network: NetworkId) -> BlockHash {
    create_genesis_block(&GenesisConfig::for_network(network)).hash
}

fn genesis_validator(network: &NetworkId) -> Address {
    Address::new(format!("genesis-validator-{}", network.as_str()))
}

fn genesis_timestamp(network: &NetworkId) -> Timestamp {
    match network {
        // 2026-01-01 00:00:00 UTC
        NetworkId::Live => Timestamp::new(1_767_225_600),
        // 2025-06-01 00:00:00 UTC
        NetworkId::Test => Timestamp::new(1_748_736_000),
        NetworkId::Dev => Timestamp::EPOCH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_hash_is_deterministic() {
        assert_eq!(genesis_hash(NetworkId::Dev), genesis_hash(NetworkId::Dev));
    }

    #[test]
    fn genesis_hashes_differ_per_network() {
        let live = genesis_hash(NetworkId::Live);
        let test = genesis_hash(NetworkId::Test);
        let dev = genesis_hash(NetworkId::Dev);
        assert_ne!(live, test);
        assert_ne!(live, dev);
        assert_ne!(test, dev);
    }

    #[test]
    fn genesis_block_shape() {
        let block = create_genesis_block(&GenesisConfig::for_network(NetworkId::Test));
        assert_eq!(block.index, 0);
        assert!(block.is_genesis());
        assert!(block.transactions.is_empty());
        assert_eq!(block.child_count(), 0);
        assert!(!block.hash.is_zero());
    }

    #[test]
    fn custom_validator_changes_hash() {
        let config = GenesisConfig {
            network: NetworkId::Dev,
            validator: Address::new("founder"),
        };
        assert_ne!(create_genesis_block(&config).hash, genesis_hash(NetworkId::Dev));
    }
}
