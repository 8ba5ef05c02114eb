//! Triad daemon: entry point for running a Triad node.
//!
//! `node run` starts a node, its integrity monitor, and a request loop that
//! reads newline-delimited JSON requests on stdin and answers on stdout.
//! `keygen` prints a fresh account key pair for signing transfers.

mod services;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use triad_consensus::ThreadRandom;
use triad_crypto::{address_of, generate_keypair, Ed25519Verifier};
use triad_node::{
    dispatch_json, init_logging, spawn_integrity_monitor, LogFormat, Node, NodeConfig,
    NodeServices, ShutdownController,
};
use triad_store::MemoryStore;
use triad_types::{NetworkId, SystemClock};

use crate::services::LogGossip;

#[derive(Parser)]
#[command(name = "triad-daemon", about = "Triad ledger node daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "TRIAD_CONFIG")]
    config: Option<PathBuf>,

    /// Network: "live", "test", or "dev".
    #[arg(long, env = "TRIAD_NETWORK")]
    network: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TRIAD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "TRIAD_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Seconds between background tree validations (0 disables).
    #[arg(long, env = "TRIAD_INTEGRITY_INTERVAL")]
    integrity_interval: Option<u64>,

    /// Print the Prometheus exposition when the node stops.
    #[arg(long, env = "TRIAD_ENABLE_METRICS")]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Node operations.
    #[command(name = "node")]
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },
    /// Print the default configuration as TOML.
    #[command(name = "default-config")]
    DefaultConfig,
    /// Generate an Ed25519 account key pair and print its address and
    /// private key as hex.
    Keygen,
}

#[derive(Subcommand)]
enum NodeAction {
    /// Run the node until stdin closes or a shutdown signal arrives.
    Run,
}

fn parse_network(s: &str) -> anyhow::Result<NetworkId> {
    match s.to_ascii_lowercase().as_str() {
        "live" => Ok(NetworkId::Live),
        "test" => Ok(NetworkId::Test),
        "dev" => Ok(NetworkId::Dev),
        other => anyhow::bail!("unknown network {other:?}"),
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => NodeConfig::default(),
    };
    if let Some(network) = &cli.network {
        config.network = parse_network(network)?;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(secs) = cli.integrity_interval {
        config.integrity_check_interval_secs = secs;
    }
    config.enable_metrics |= cli.metrics;
    Ok(config)
}

async fn serve_stdin(node: Arc<Node>, shutdown: &ShutdownController) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut stop = shutdown.subscribe();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading request")? else {
                    tracing::info!("request stream closed");
                    return Ok(());
                };
                if line.trim().is_empty() {
                    continue;
                }
                let node = Arc::clone(&node);
                let reply = tokio::task::spawn_blocking(move || dispatch_json(&node, &line))
                    .await
                    .context("request handler panicked")?;
                stdout.write_all(reply.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            _ = stop.recv() => return Ok(()),
        }
    }
}

async fn run(config: NodeConfig) -> anyhow::Result<()> {
    tracing::info!(
        network = config.network.as_str(),
        integrity_interval = config.integrity_check_interval_secs,
        "starting Triad node"
    );
    let node = Arc::new(Node::new(
        config.clone(),
        NodeServices {
            store: Arc::new(MemoryStore::new()),
            gossip: Arc::new(LogGossip),
            verifier: Arc::new(Ed25519Verifier),
            random: Arc::new(ThreadRandom),
            clock: Arc::new(SystemClock),
        },
    )?);

    let shutdown = Arc::new(ShutdownController::new());
    let monitor = (config.integrity_check_interval_secs > 0).then(|| {
        spawn_integrity_monitor(
            Arc::clone(&node),
            Duration::from_secs(config.integrity_check_interval_secs),
            shutdown.subscribe(),
        )
    });

    let signals = {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move { shutdown.wait_for_signal().await })
    };

    let served = serve_stdin(Arc::clone(&node), &shutdown).await;
    shutdown.shutdown();
    signals.abort();
    if let Some(monitor) = monitor {
        if let Err(e) = monitor.await {
            tracing::warn!(error = %e, "integrity monitor ended abnormally");
        }
    }

    if config.enable_metrics {
        println!("{}", node.metrics().encode()?);
    }
    tracing::info!("Triad daemon exited cleanly");
    served
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Command::DefaultConfig => {
            print!("{}", NodeConfig::default().to_toml_string()?);
            Ok(())
        }
        Command::Keygen => {
            let keys = generate_keypair();
            println!("address     = {}", address_of(&keys.public));
            println!("private_key = {}", hex::encode(keys.private.0));
            Ok(())
        }
        Command::Node { action } => match action {
            NodeAction::Run => {
                init_logging(config.log_format, &config.log_level);
                run(config).await
            }
        },
    }
}
