//! API Server Module
//!
//! This module implements the HTTP transport in front of the dispatcher.
//! A single POST endpoint accepts one JSON-RPC request or a batch of them.

use crate::{
    api::{
        dispatcher::Dispatcher,
        envelope::{JsonRpcRequest, JsonRpcResponse, RpcError},
    },
    config::ApiConfig,
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;
use tracing::{info, warn};

/// The main API server struct
///
/// Encapsulates the listening address and the dispatcher serving requests.
pub struct Server {
    config: ApiConfig,
    dispatcher: Dispatcher,
}

impl Server {
    /// Creates a new API server instance
    ///
    /// # Arguments
    /// * `config` - Listening address (host, port)
    /// * `dispatcher` - Dispatcher every request is routed through
    pub fn new(config: ApiConfig, dispatcher: Dispatcher) -> Self {
        Self { config, dispatcher }
    }

    /// Starts the API server and begins listening for incoming requests
    ///
    /// # Returns
    /// Runs until the listener fails, or returns an error if binding fails
    pub async fn start(self) -> anyhow::Result<()> {
        let app = router(self.dispatcher);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Router with the JSON-RPC endpoint at "/"
pub fn router(dispatcher: Dispatcher) -> Router {
    Router::new()
        .route("/", post(handle_rpc))
        .with_state(dispatcher)
}

/// Main RPC request handler
///
/// The body is parsed by hand rather than through the `Json` extractor so
/// malformed payloads still get a JSON-RPC error envelope.
async fn handle_rpc(State(dispatcher): State<Dispatcher>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Failed to parse request body: {}", e);
            return Json(JsonRpcResponse::failure(Value::Null, RpcError::parse_error(e)))
                .into_response();
        }
    };

    match payload {
        Value::Array(calls) if calls.is_empty() => Json(JsonRpcResponse::failure(
            Value::Null,
            RpcError::invalid_request("empty batch"),
        ))
        .into_response(),
        // Batch members are served in order, one at a time
        Value::Array(calls) => {
            let mut responses = Vec::with_capacity(calls.len());
            for call in calls {
                responses.push(handle_call(&dispatcher, call).await);
            }
            Json(responses).into_response()
        }
        call => Json(handle_call(&dispatcher, call).await).into_response(),
    }
}

async fn handle_call(dispatcher: &Dispatcher, call: Value) -> JsonRpcResponse {
    let id = call.get("id").cloned().unwrap_or(Value::Null);
    match serde_json::from_value::<JsonRpcRequest>(call) {
        Ok(request) => dispatcher.dispatch(request).await.into_response(),
        Err(e) => {
            warn!("Invalid JSON-RPC request: {}", e);
            JsonRpcResponse::failure(id, RpcError::invalid_request(e))
        }
    }
}
