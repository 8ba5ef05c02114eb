//! Boundary request and response types.
//!
//! The transport layer (WebSocket/HTTP) lives outside the node. It decodes
//! a JSON request tagged by `action`, hands it to [`dispatch`] or
//! [`dispatch_json`], and writes back the JSON response. Failures carry an
//! [`ErrorBody`] whose `kind` tells the transport how to classify them.

use serde::{Deserialize, Serialize};

use triad_ledger::AccountSnapshot;
use triad_types::{
    Address, BlockHash, DeviceId, ErrorKind, PocContribution, Signature, TokenAmount, Transaction,
};

use crate::node::Node;
use crate::NodeError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&NodeError> for ErrorBody {
    fn from(e: &NodeError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

// ── Registration ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub address: String,
    pub device_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

// ── Contribution ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContributionRequest {
    pub address: String,
    pub device_id: String,
    #[serde(default)]
    pub computations: u64,
    #[serde(default)]
    pub storage: f64,
    #[serde(default)]
    pub bandwidth: f64,
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub eco_actions: u64,
}

impl ContributionRequest {
    pub fn report(&self) -> PocContribution {
        PocContribution {
            computations: self.computations,
            storage: self.storage,
            bandwidth: self.bandwidth,
            uptime: self.uptime,
            eco_actions: self.eco_actions,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContributionResponse {
    pub status: Status,
    pub tokens_minted: u64,
    pub reputation_score: f64,
    #[serde(default)]
    pub cheat_detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

// ── Transfer ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: u64,
    pub nonce: u64,
    /// Hex-encoded signature over the canonical transfer bytes.
    pub signature: Signature,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferResponse {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

// ── Block proposal ───────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposeBlockRequest {
    /// Hex-encoded hash of the parent block.
    pub parent_hash: String,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    pub validator: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposeBlockResponse {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

// ── Queries ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidateTreeResponse {
    pub valid: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountInfoRequest {
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountInfoResponse {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Generic failure for requests that could not be decoded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: Status,
    pub error: ErrorBody,
}

// ── Dispatch ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    Register(RegisterRequest),
    Contribute(ContributionRequest),
    Transfer(TransferRequest),
    ProposeBlock(ProposeBlockRequest),
    ValidateTree,
    AccountInfo(AccountInfoRequest),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Register(RegisterResponse),
    Contribute(ContributionResponse),
    Transfer(TransferResponse),
    ProposeBlock(ProposeBlockResponse),
    ValidateTree(ValidateTreeResponse),
    AccountInfo(AccountInfoResponse),
    Error(ErrorResponse),
}

fn status_of<T>(result: &Result<T, NodeError>) -> (Status, Option<ErrorBody>) {
    match result {
        Ok(_) => (Status::Success, None),
        Err(e) => (Status::Error, Some(ErrorBody::from(e))),
    }
}

/// Run one decoded request against the node.
pub fn dispatch(node: &Node, request: Request) -> Response {
    match request {
        Request::Register(req) => {
            let result = Address::parse(req.address)
                .and_then(|a| Ok((a, DeviceId::parse(req.device_id)?)))
                .map_err(NodeError::from)
                .and_then(|(address, device)| node.register(address, device));
            let (status, error) = status_of(&result);
            Response::Register(RegisterResponse { status, error })
        }
        Request::Contribute(req) => {
            let report = req.report();
            let result = Address::parse(req.address)
                .and_then(|a| Ok((a, DeviceId::parse(req.device_id)?)))
                .map_err(NodeError::from)
                .and_then(|(address, device)| node.contribute(&address, &device, &report));
            let (status, error) = status_of(&result);
            let (tokens_minted, reputation_score, cheat_detected) = match &result {
                Ok(receipt) => (
                    receipt.tokens_minted.raw(),
                    receipt.reputation_score,
                    receipt.cheat_detected,
                ),
                Err(_) => (0, 0.0, false),
            };
            Response::Contribute(ContributionResponse {
                status,
                tokens_minted,
                reputation_score,
                cheat_detected,
                error,
            })
        }
        Request::Transfer(req) => {
            let result = Address::parse(req.from)
                .and_then(|from| Ok((from, Address::parse(req.to)?)))
                .map_err(NodeError::from)
                .and_then(|(from, to)| {
                    node.transfer(&from, &to, TokenAmount::new(req.amount), req.nonce, &req.signature)
                });
            let (status, error) = status_of(&result);
            Response::Transfer(TransferResponse { status, error })
        }
        Request::ProposeBlock(req) => {
            let result = BlockHash::from_hex(&req.parent_hash)
                .and_then(|parent| Ok((parent, Address::parse(req.validator)?)))
                .map_err(NodeError::from)
                .and_then(|(parent, validator)| {
                    node.propose_block(&parent, req.transactions, validator)
                });
            let (status, error) = status_of(&result);
            Response::ProposeBlock(ProposeBlockResponse {
                status,
                new_block_hash: result.ok().map(|h| h.to_hex()),
                error,
            })
        }
        Request::ValidateTree => Response::ValidateTree(ValidateTreeResponse {
            valid: node.validate_tree(),
        }),
        Request::AccountInfo(req) => {
            let result = Address::parse(req.address)
                .map_err(NodeError::from)
                .and_then(|address| {
                    node.account(&address)
                        .ok_or(NodeError::Ledger(triad_ledger::LedgerError::UnknownAccount(address)))
                });
            let (status, error) = status_of(&result);
            Response::AccountInfo(AccountInfoResponse {
                status,
                account: result.ok(),
                error,
            })
        }
    }
}

/// Decode a JSON request, run it, and encode the response.
pub fn dispatch_json(node: &Node, raw: &str) -> String {
    let response = match serde_json::from_str::<Request>(raw) {
        Ok(request) => dispatch(node, request),
        Err(e) => {
            let error = NodeError::InvalidRequest(e.to_string());
            tracing::debug!(error = %error, "undecodable request");
            Response::Error(ErrorResponse {
                status: Status::Error,
                error: ErrorBody::from(&error),
            })
        }
    };
    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(
            r#"{{"status":"error","error":{{"kind":"internal","message":{:?}}}}}"#,
            e.to_string()
        )
    })
}
