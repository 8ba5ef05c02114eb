//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use triad_ledger::LedgerParams;
use triad_reputation::{AuditConfig, RateWindow, DEFAULT_CHEAT_CEILING};
use triad_types::{NetworkId, TokenAmount};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a Triad node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Which network's genesis block to start from.
    #[serde(default)]
    pub network: NetworkId,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Balance credited to every newly registered account.
    #[serde(default = "default_starting_balance")]
    pub starting_balance: u64,

    /// Reset an existing account on re-registration instead of refusing.
    #[serde(default)]
    pub allow_reregistration: bool,

    /// Computations in a single report above which it is flagged as cheating.
    #[serde(default = "default_cheat_ceiling")]
    pub cheat_ceiling: u64,

    /// Length of the per-account rate window. Zero disables the window.
    #[serde(default)]
    pub audit_window_secs: u64,

    /// Computations allowed per account within one rate window.
    #[serde(default = "default_cheat_ceiling")]
    pub audit_window_max_computations: u64,

    /// Seconds between background tree validations. Zero disables the monitor.
    #[serde(default = "default_integrity_interval")]
    pub integrity_check_interval_secs: u64,

    /// Whether the daemon logs the Prometheus exposition on shutdown.
    #[serde(default)]
    pub enable_metrics: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_starting_balance() -> u64 {
    triad_ledger::params::DEFAULT_STARTING_BALANCE.raw()
}

fn default_cheat_ceiling() -> u64 {
    DEFAULT_CHEAT_CEILING
}

fn default_integrity_interval() -> u64 {
    60
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            NodeError::Config(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn ledger_params(&self) -> LedgerParams {
        LedgerParams {
            starting_balance: TokenAmount::new(self.starting_balance),
            allow_reregistration: self.allow_reregistration,
        }
    }

    pub fn audit_config(&self) -> AuditConfig {
        let window = (self.audit_window_secs > 0).then_some(RateWindow {
            window_secs: self.audit_window_secs,
            max_computations: self.audit_window_max_computations,
        });
        AuditConfig {
            cheat_ceiling: self.cheat_ceiling,
            window,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: NetworkId::default(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            starting_balance: default_starting_balance(),
            allow_reregistration: false,
            cheat_ceiling: default_cheat_ceiling(),
            audit_window_secs: 0,
            audit_window_max_computations: default_cheat_ceiling(),
            integrity_check_interval_secs: default_integrity_interval(),
            enable_metrics: false,
        }
    }
}
