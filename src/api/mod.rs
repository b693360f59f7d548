//! API Module
//!
//! This module handles the JSON-RPC surface of the node:
//! - `Dispatcher`: routes calls and contains failures
//! - `Server`: the HTTP endpoint in front of the dispatcher
//! - envelopes and the `RpcError` both error surfaces report

mod dispatcher;
mod envelope;
mod server;


pub use dispatcher::Dispatcher;
pub use envelope::{CallOutcome, JsonRpcRequest, JsonRpcResponse, RpcError};
pub use server::{Server, router};
