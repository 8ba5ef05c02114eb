//! The Triad node: wires the tree, ledger, consensus and collaborators together.
//!
//! Core state lives in memory. Every accepted change is written through
//! [`KvStore`] afterwards; a failed write is logged and counted but does not
//! undo the in-memory change. Blocks are handed to [`Gossip`] the same way.
//!
//! Account writes go out under `write_order`, which is held from the ledger
//! call to the last put, so the store sees account records in ledger order.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use triad_consensus::{ConsensusSelector, RandomSource};
use triad_crypto::SignatureVerifier;
use triad_emission::EmissionEngine;
use triad_ledger::{AccountSnapshot, ContributionReceipt, LedgerState};
use triad_reputation::ContributionAuditor;
use triad_store::{keys, load_prefix, put_record, KvStore};
use triad_tree::{Block, BlockStore, GenesisConfig, Gossip, TreeError};
use triad_types::transaction::transfer_signing_bytes;
use triad_types::{
    Address, BlockHash, Clock, DeviceId, PocContribution, Signature, Timestamp, TokenAmount,
    Transaction,
};

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::metrics::NodeMetrics;

/// External collaborators the node talks to.
pub struct NodeServices {
    pub store: Arc<dyn KvStore>,
    pub gossip: Arc<dyn Gossip>,
    pub verifier: Arc<dyn SignatureVerifier>,
    pub random: Arc<dyn RandomSource>,
    pub clock: Arc<dyn Clock>,
}

/// Persisted form of a block. `seq` is the insertion position, so reloading
/// in `seq` order reproduces the same child slots.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredBlock {
    pub seq: u64,
    pub block: Block,
}

/// Persisted device binding. Removal writes `active: false`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub address: Address,
    pub device_id: DeviceId,
    pub active: bool,
    pub updated_at: Timestamp,
}

pub struct Node {
    config: NodeConfig,
    tree: RwLock<BlockStore>,
    ledger: Arc<LedgerState>,
    consensus: Arc<ConsensusSelector>,
    services: NodeServices,
    metrics: NodeMetrics,
    write_order: Mutex<()>,
}

impl Node {
    /// Build a node from its configuration and load any persisted state.
    pub fn new(config: NodeConfig, services: NodeServices) -> Result<Self, NodeError> {
        let consensus = Arc::new(ConsensusSelector::new());
        let ledger = Arc::new(LedgerState::new(
            config.ledger_params(),
            Arc::clone(&consensus),
            ContributionAuditor::new(config.audit_config()),
            EmissionEngine::default(),
        ));
        let tree = BlockStore::create_genesis(&GenesisConfig::for_network(config.network));
        let node = Self {
            config,
            tree: RwLock::new(tree),
            ledger,
            consensus,
            services,
            metrics: NodeMetrics::new()?,
            write_order: Mutex::new(()),
        };
        node.load()?;
        node.refresh_gauges();
        tracing::info!(
            network = node.config.network.as_str(),
            accounts = node.ledger.participant_count(),
            blocks = node.block_count(),
            "node initialised"
        );
        Ok(node)
    }

    fn load(&self) -> Result<(), NodeError> {
        let store = self.services.store.as_ref();
        let accounts: Vec<AccountSnapshot> = load_prefix(store, keys::ACCOUNT_PREFIX)?;
        for snapshot in accounts {
            self.ledger.restore(snapshot);
        }

        let mut blocks: Vec<StoredBlock> = load_prefix(store, keys::BLOCK_PREFIX)?;
        blocks.sort_by_key(|b| b.seq);
        let mut tree = self.tree_write();
        for stored in blocks {
            if tree.contains(&stored.block.hash) {
                continue;
            }
            tree.import_block(stored.block)?;
        }
        Ok(())
    }

    fn tree_read(&self) -> RwLockReadGuard<'_, BlockStore> {
        self.tree.read().unwrap_or_else(|e| e.into_inner())
    }

    fn tree_write(&self) -> RwLockWriteGuard<'_, BlockStore> {
        self.tree.write().unwrap_or_else(|e| e.into_inner())
    }

    fn ordered_writes(&self) -> MutexGuard<'_, ()> {
        self.write_order.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Accounts ─────────────────────────────────────────────────────────

    pub fn register(&self, address: Address, device_id: DeviceId) -> Result<(), NodeError> {
        {
            let _order = self.ordered_writes();
            let snapshot = self.ledger.register(address.clone(), device_id.clone())?;
            self.persist_account(&snapshot);
            self.persist_device(&address, &device_id, true);
        }
        self.metrics.registrations.inc();
        self.refresh_gauges();
        Ok(())
    }

    pub fn add_device(&self, address: &Address, device_id: DeviceId) -> Result<(), NodeError> {
        let _order = self.ordered_writes();
        let snapshot = self.ledger.add_device(address, device_id.clone())?;
        self.persist_account(&snapshot);
        self.persist_device(address, &device_id, true);
        Ok(())
    }

    pub fn remove_device(&self, address: &Address, device_id: &DeviceId) -> Result<(), NodeError> {
        let _order = self.ordered_writes();
        let snapshot = self.ledger.remove_device(address, device_id)?;
        self.persist_account(&snapshot);
        self.persist_device(address, device_id, false);
        Ok(())
    }

    /// Penalise an account for a failed authentication. Returns the new score.
    pub fn record_invalid_auth(&self, address: &Address) -> Result<f64, NodeError> {
        let snapshot = {
            let _order = self.ordered_writes();
            let snapshot = self.ledger.record_invalid_auth(address)?;
            self.persist_account(&snapshot);
            snapshot
        };
        self.metrics.invalid_auths.inc();
        Ok(snapshot.reputation.score)
    }

    pub fn contribute(
        &self,
        address: &Address,
        device_id: &DeviceId,
        report: &PocContribution,
    ) -> Result<ContributionReceipt, NodeError> {
        let now = self.services.clock.now();
        let receipt = {
            let _order = self.ordered_writes();
            let receipt = self
                .ledger
                .credit_contribution(address, device_id, report, now)?;
            self.persist_account(&receipt.account);
            receipt
        };
        self.metrics.contributions.inc();
        self.metrics.tokens_minted.inc_by(receipt.tokens_minted.raw());
        if receipt.cheat_detected {
            self.metrics.cheats_detected.inc();
            tracing::warn!(%address, %device_id, computations = report.computations, "cheating detected");
        }
        self.refresh_gauges();
        Ok(receipt)
    }

    /// Verify the sender's signature and apply a transfer.
    ///
    /// The accepted transaction is stamped with the clock and the latest
    /// block hash, persisted, and returned.
    pub fn transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: TokenAmount,
        nonce: u64,
        signature: &Signature,
    ) -> Result<Transaction, NodeError> {
        let message = transfer_signing_bytes(self.config.network, from, to, amount, nonce);
        if !self.services.verifier.verify(from, &message, signature) {
            self.metrics.transfers_rejected.inc();
            tracing::warn!(%from, %to, nonce, "transfer signature rejected");
            return Err(NodeError::InvalidSignature {
                signer: from.clone(),
            });
        }
        let prev_hash = self.tree_read().latest().hash;
        let tx = {
            let _order = self.ordered_writes();
            let receipt = match self.ledger.execute_transfer(from, to, amount, nonce) {
                Ok(receipt) => receipt,
                Err(e) => {
                    self.metrics.transfers_rejected.inc();
                    tracing::debug!(%from, %to, nonce, error = %e, "transfer rejected");
                    return Err(e.into());
                }
            };
            let tx = Transaction {
                sender: from.clone(),
                recipient: to.clone(),
                amount,
                timestamp: self.services.clock.now(),
                nonce,
                prev_hash,
                signature: signature.clone(),
            };
            self.persist(&keys::transaction(from, nonce), &tx);
            self.persist_account(&receipt.sender);
            self.persist_account(&receipt.recipient);
            tx
        };
        self.metrics.transfers_accepted.inc();
        tracing::info!(%from, %to, %amount, nonce, "transfer accepted");
        Ok(tx)
    }

    pub fn account(&self, address: &Address) -> Option<AccountSnapshot> {
        self.ledger.account(address)
    }

    /// Transfers sent by `address`, in nonce order.
    pub fn transactions_of(&self, address: &Address) -> Result<Vec<Transaction>, NodeError> {
        Ok(load_prefix(
            self.services.store.as_ref(),
            &keys::transactions_of(address),
        )?)
    }

    /// Device records ever written for `address`, including removed ones.
    pub fn device_records(&self, address: &Address) -> Result<Vec<DeviceRecord>, NodeError> {
        Ok(load_prefix(
            self.services.store.as_ref(),
            &keys::devices_of(address),
        )?)
    }

    // ── Blocks ───────────────────────────────────────────────────────────

    /// Draw a new leader for the next round.
    pub fn elect_leader(&self) -> Option<Address> {
        self.consensus.elect_leader(self.services.random.as_ref())
    }

    /// Attach a block proposed by `validator` under `parent_hash`.
    ///
    /// A leader is drawn first if there is no round. The proposer must be
    /// that leader, trusted, and a contributor; every carried transaction
    /// must verify. The proposer claims the round before attaching, so a
    /// second proposal in the same round fails with a conflict. After the
    /// block attaches a new leader is drawn for the next round.
    pub fn propose_block(
        &self,
        parent_hash: &BlockHash,
        transactions: Vec<Transaction>,
        validator: Address,
    ) -> Result<BlockHash, NodeError> {
        let started = Instant::now();
        let result = self.try_propose(parent_hash, transactions, validator);
        self.metrics
            .proposal_time_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);
        if let Err(e) = &result {
            self.metrics.proposals_rejected.inc();
            tracing::warn!(parent = %parent_hash, error = %e, "block proposal rejected");
        }
        result
    }

    fn try_propose(
        &self,
        parent_hash: &BlockHash,
        transactions: Vec<Transaction>,
        validator: Address,
    ) -> Result<BlockHash, NodeError> {
        self.consensus.ensure_leader(self.services.random.as_ref());
        let contribution = self.ledger.contribution(&validator).unwrap_or_default();
        self.consensus.check_proposer(&validator, &contribution)?;
        let network = self.config.network;
        for tx in &transactions {
            if !self
                .services
                .verifier
                .verify(&tx.sender, &tx.signing_bytes(network), &tx.signature)
            {
                return Err(NodeError::InvalidSignature {
                    signer: tx.sender.clone(),
                });
            }
        }

        self.consensus.claim_round(&validator, &contribution)?;
        let timestamp = self.services.clock.now();
        let attached = {
            let mut tree = self.tree_write();
            let appended = tree
                .append_block(parent_hash, transactions, validator.clone(), timestamp)
                .map_err(NodeError::from)
                .and_then(|hash| stored_block(&tree, hash));
            appended
        };
        let (stored, count) = match attached {
            Ok(attached) => attached,
            Err(e) => {
                self.consensus.release_round(&validator);
                return Err(e);
            }
        };
        let hash = stored.block.hash;
        self.after_attach(stored, count);
        self.elect_leader();
        Ok(hash)
    }

    /// Import a block received from a peer.
    pub fn receive_block(&self, block: Block) -> Result<BlockHash, NodeError> {
        let (stored, count) = {
            let mut tree = self.tree_write();
            let hash = tree.import_block(block)?;
            stored_block(&tree, hash)?
        };
        let hash = stored.block.hash;
        tracing::info!(%hash, index = stored.block.index, "block received");
        self.metrics.blocks_appended.inc();
        self.metrics.block_count.set(count as i64);
        self.persist(&keys::block(&hash), &stored);
        Ok(hash)
    }

    fn after_attach(&self, stored: StoredBlock, count: usize) {
        let hash = stored.block.hash;
        tracing::info!(
            %hash,
            index = stored.block.index,
            validator = %stored.block.validator,
            txs = stored.block.transactions.len(),
            "block appended"
        );
        self.metrics.blocks_appended.inc();
        self.metrics.block_count.set(count as i64);
        self.persist(&keys::block(&hash), &stored);
        if let Err(e) = self.services.gossip.broadcast(&stored.block) {
            self.metrics.gossip_failures.inc();
            tracing::warn!(%hash, error = %e, "block broadcast failed");
        }
    }

    /// Full structural and hash check of the tree.
    ///
    /// A failure raises an error-level alert and bumps the integrity counter.
    pub fn validate_tree(&self) -> bool {
        let outcome = self.tree_read().verify();
        match outcome {
            Ok(()) => true,
            Err(e) => {
                self.metrics.integrity_failures.inc();
                tracing::error!(error = %e, "triad tree integrity check failed");
                false
            }
        }
    }

    pub fn block(&self, hash: &BlockHash) -> Option<Block> {
        self.tree_read().get(hash).cloned()
    }

    pub fn children(&self, hash: &BlockHash) -> Option<Vec<BlockHash>> {
        self.tree_read().children(hash)
    }

    pub fn root_hash(&self) -> BlockHash {
        self.tree_read().root().hash
    }

    /// Subtree digest of the root, committing to the whole tree.
    pub fn tree_digest(&self) -> BlockHash {
        self.tree_read().root().subtree_hash
    }

    pub fn latest_block_hash(&self) -> BlockHash {
        self.tree_read().latest().hash
    }

    pub fn block_count(&self) -> usize {
        self.tree_read().len()
    }

    /// Run `f` with exclusive access to the tree.
    ///
    /// For repair tooling and tests that need to inspect or tamper with
    /// stored blocks.
    pub fn with_tree_mut<R>(&self, f: impl FnOnce(&mut BlockStore) -> R) -> R {
        f(&mut self.tree_write())
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<LedgerState> {
        &self.ledger
    }

    pub fn consensus(&self) -> &Arc<ConsensusSelector> {
        &self.consensus
    }

    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    // ── Persistence ──────────────────────────────────────────────────────

    fn persist<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = put_record(self.services.store.as_ref(), key, value) {
            self.metrics.persistence_failures.inc();
            tracing::error!(key, error = %e, "failed to persist record");
        }
    }

    fn persist_account(&self, snapshot: &AccountSnapshot) {
        self.persist(&keys::account(&snapshot.address), snapshot);
    }

    fn persist_device(&self, address: &Address, device_id: &DeviceId, active: bool) {
        let record = DeviceRecord {
            address: address.clone(),
            device_id: device_id.clone(),
            active,
            updated_at: self.services.clock.now(),
        };
        self.persist(&keys::device(address, device_id), &record);
    }

    fn refresh_gauges(&self) {
        self.metrics
            .account_count
            .set(self.ledger.participant_count() as i64);
        self.metrics
            .total_supply
            .set(i64::try_from(self.ledger.total_supply().raw()).unwrap_or(i64::MAX));
        self.metrics.block_count.set(self.block_count() as i64);
    }
}

/// The just-attached block with its insertion position, plus the tree size.
fn stored_block(tree: &BlockStore, hash: BlockHash) -> Result<(StoredBlock, usize), NodeError> {
    let block = tree.get(&hash).cloned().ok_or(TreeError::IntegrityFailure {
        hash,
        reason: "attached block missing from index".into(),
    })?;
    let count = tree.len();
    Ok((
        StoredBlock {
            seq: count.saturating_sub(1) as u64,
            block,
        },
        count,
    ))
}
