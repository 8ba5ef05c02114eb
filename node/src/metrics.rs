//! Prometheus metrics for the Triad node.
//!
//! [`NodeMetrics`] owns a dedicated [`Registry`]; [`NodeMetrics::encode`]
//! renders it in the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge,
    Opts, Registry, TextEncoder,
};

/// Central collection of all node-level Prometheus metrics.
pub struct NodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    pub registrations: IntCounter,
    pub transfers_accepted: IntCounter,
    /// Transfers refused by signature check or ledger validation.
    pub transfers_rejected: IntCounter,
    pub contributions: IntCounter,
    pub cheats_detected: IntCounter,
    pub tokens_minted: IntCounter,
    /// Blocks attached locally or imported from peers.
    pub blocks_appended: IntCounter,
    pub proposals_rejected: IntCounter,
    pub integrity_failures: IntCounter,
    pub invalid_auths: IntCounter,
    /// Store writes that failed after the in-memory change was applied.
    pub persistence_failures: IntCounter,
    pub gossip_failures: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    pub account_count: IntGauge,
    pub block_count: IntGauge,
    pub total_supply: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time spent validating and attaching a proposed block, in milliseconds.
    pub proposal_time_ms: Histogram,
}

fn counter(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntCounter> {
    register_int_counter_with_registry!(Opts::new(name, help), registry)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> prometheus::Result<IntGauge> {
    register_int_gauge_with_registry!(Opts::new(name, help), registry)
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new [`Registry`].
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let registrations = counter(&registry, "triad_registrations_total", "Accounts registered")?;
        let transfers_accepted = counter(
            &registry,
            "triad_transfers_accepted_total",
            "Transfers applied to the ledger",
        )?;
        let transfers_rejected = counter(
            &registry,
            "triad_transfers_rejected_total",
            "Transfers refused",
        )?;
        let contributions = counter(
            &registry,
            "triad_contributions_total",
            "Contribution reports credited",
        )?;
        let cheats_detected = counter(
            &registry,
            "triad_cheats_detected_total",
            "Contribution reports flagged as cheating",
        )?;
        let tokens_minted = counter(&registry, "triad_tokens_minted_total", "Tokens minted")?;
        let blocks_appended = counter(
            &registry,
            "triad_blocks_appended_total",
            "Blocks attached to the triad tree",
        )?;
        let proposals_rejected = counter(
            &registry,
            "triad_proposals_rejected_total",
            "Block proposals refused",
        )?;
        let integrity_failures = counter(
            &registry,
            "triad_integrity_failures_total",
            "Tree validations that found inconsistent hashes or links",
        )?;
        let invalid_auths = counter(
            &registry,
            "triad_invalid_auth_total",
            "Failed authentications reported by the transport",
        )?;
        let persistence_failures = counter(
            &registry,
            "triad_persistence_failures_total",
            "Failed store writes",
        )?;
        let gossip_failures = counter(
            &registry,
            "triad_gossip_failures_total",
            "Failed block broadcasts",
        )?;

        let account_count = gauge(&registry, "triad_account_count", "Registered accounts")?;
        let block_count = gauge(&registry, "triad_block_count", "Blocks in the triad tree")?;
        let total_supply = gauge(&registry, "triad_total_supply", "Sum of all balances")?;

        let proposal_time_ms = register_histogram_with_registry!(
            HistogramOpts::new(
                "triad_proposal_time_ms",
                "Block proposal handling time in milliseconds"
            )
            .buckets(prometheus::exponential_buckets(0.1, 2.0, 15)?),
            registry
        )?;

        Ok(Self {
            registry,
            registrations,
            transfers_accepted,
            transfers_rejected,
            contributions,
            cheats_detected,
            tokens_minted,
            blocks_appended,
            proposals_rejected,
            integrity_failures,
            invalid_auths,
            persistence_failures,
            gossip_failures,
            account_count,
            block_count,
            total_supply,
            proposal_time_ms,
        })
    }

    /// Render every metric in the text exposition format.
    pub fn encode(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
