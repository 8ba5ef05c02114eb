//! Triad node: orchestrates the triad tree, ledger and consensus.
//!
//! The node is the single entry point for client sessions and peers:
//! - registers accounts and devices
//! - credits audited contribution reports
//! - verifies and applies signed transfers
//! - accepts block proposals from the elected leader and imports peer blocks
//! - persists every accepted change and broadcasts new blocks
//! - watches tree integrity in the background

pub mod api;
pub mod config;
pub mod error;
pub mod integrity;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod shutdown;

pub use api::{dispatch, dispatch_json, ErrorBody, Request, Response, Status};
pub use config::NodeConfig;
pub use error::NodeError;
pub use integrity::spawn_integrity_monitor;
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::{DeviceRecord, Node, NodeServices, StoredBlock};
pub use shutdown::{ShutdownController, ShutdownReason};
