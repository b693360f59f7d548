//! JSON-RPC Envelope Module
//!
//! Request and response envelopes, and the error value shared by both
//! error-reporting surfaces.

use crate::{ExecutionError, RejectionKind, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

fn default_version() -> String {
    "2.0".to_string()
}

/// JSON-RPC 2.0 request structure
///
/// - `jsonrpc`: Protocol version (defaults to "2.0" when omitted)
/// - `method`: The RPC method to call (e.g., "eth_sendTransaction")
/// - `params`: Positional method parameters
/// - `id`: Request identifier for matching responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: Value, id: impl Into<Value>) -> Self {
        Self {
            jsonrpc: default_version(),
            method: method.into(),
            params,
            id: id.into(),
        }
    }
}

/// JSON-RPC 2.0 response structure
///
/// Either `result` or `error` is populated, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: default_version(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: default_version(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error object
///
/// - `code`: Error code (e.g., -32601 for method not found, -32602 for invalid params)
/// - `message`: Human-readable error description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
    /// Transaction refused by the validator or the executor
    pub const TRANSACTION_REJECTED: i64 = -32000;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn parse_error(reason: impl std::fmt::Display) -> Self {
        Self::new(Self::PARSE_ERROR, format!("Parse error: {reason}"))
    }

    pub fn invalid_request(reason: impl std::fmt::Display) -> Self {
        Self::new(Self::INVALID_REQUEST, format!("Invalid request: {reason}"))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(Self::METHOD_NOT_FOUND, format!("Method '{method}' not found"))
    }

    pub fn invalid_params(reason: impl std::fmt::Display) -> Self {
        Self::new(Self::INVALID_PARAMS, format!("Invalid params: {reason}"))
    }

    pub fn internal(reason: impl std::fmt::Display) -> Self {
        Self::new(Self::INTERNAL_ERROR, format!("Internal error: {reason}"))
    }
}

impl From<ValidationError> for RpcError {
    fn from(error: ValidationError) -> Self {
        let code = match error.kind() {
            RejectionKind::InvalidParameterShape => Self::INVALID_PARAMS,
            RejectionKind::NonceMismatch | RejectionKind::InsufficientFunds => {
                Self::TRANSACTION_REJECTED
            }
        };
        Self::new(code, error.to_string())
    }
}

impl From<ExecutionError> for RpcError {
    fn from(error: ExecutionError) -> Self {
        Self::new(Self::TRANSACTION_REJECTED, error.to_string())
    }
}

/// Outcome of one dispatched call.
///
/// A single result with two views: [`CallOutcome::error`] is what a
/// callback-style caller receives as its error argument, and
/// [`CallOutcome::response`] is the envelope with the same error embedded.
/// Both read the same [`RpcError`], so their messages cannot drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    id: Value,
    result: Result<Value, RpcError>,
}

impl CallOutcome {
    pub fn new(id: Value, result: Result<Value, RpcError>) -> Self {
        Self { id, result }
    }

    pub fn id(&self) -> &Value {
        &self.id
    }

    pub fn result(&self) -> &Result<Value, RpcError> {
        &self.result
    }

    /// Completion-signal view
    pub fn error(&self) -> Option<&RpcError> {
        self.result.as_ref().err()
    }

    /// Envelope view
    pub fn response(&self) -> JsonRpcResponse {
        self.clone().into_response()
    }

    pub fn into_response(self) -> JsonRpcResponse {
        match self.result {
            Ok(result) => JsonRpcResponse::success(self.id, result),
            Err(error) => JsonRpcResponse::failure(self.id, error),
        }
    }
}
