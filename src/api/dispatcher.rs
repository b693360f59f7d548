//! Dispatcher Module
//!
//! Routes each call by method name and keeps failures contained. Every call
//! runs in its own task: a handler that panics is reported as an internal
//! error and the next call is served normally.

use crate::{
    TransactionReceipt, TransactionRequest, ValidationError,
    api::envelope::{CallOutcome, JsonRpcRequest, JsonRpcResponse, RpcError},
    config::{ChainConfig, Config},
    execution::{Executor, TransferExecutor},
    registry::ReceiptRegistry,
    state::StateCache,
    validation::{Normalizer, Validator, describe, parse_address, parse_hash},
};
use ethers::types::{U256, U64};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shared handle to every component a call may touch.
///
/// Cloning is cheap; all clones serve the same node.
#[derive(Clone)]
pub struct Dispatcher {
    chain: ChainConfig,
    default_gas_price: u64,
    state_cache: StateCache,
    normalizer: Normalizer,
    validator: Validator,
    executor: Arc<dyn Executor>,
    receipts: ReceiptRegistry,
}

impl Dispatcher {
    /// Creates a dispatcher committing through [`TransferExecutor`]
    pub fn new(config: &Config, state_cache: StateCache) -> Self {
        Self::with_executor(config, state_cache, Arc::new(TransferExecutor))
    }

    pub fn with_executor(
        config: &Config,
        state_cache: StateCache,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            chain: config.chain.clone(),
            default_gas_price: config.gas.default_gas_price,
            normalizer: Normalizer::new(config.gas.clone()),
            validator: Validator::new(state_cache.clone()),
            state_cache,
            executor,
            receipts: ReceiptRegistry::new(),
        }
    }

    pub fn state(&self) -> &StateCache {
        &self.state_cache
    }

    pub fn receipts(&self) -> &ReceiptRegistry {
        &self.receipts
    }

    /// Process one call to completion
    pub async fn dispatch(&self, request: JsonRpcRequest) -> CallOutcome {
        info!("Received RPC request: {}", request.method);
        let id = request.id.clone();
        let method = request.method.clone();

        let this = self.clone();
        let result = match tokio::spawn(async move { this.route(request).await }).await {
            Ok(result) => result,
            Err(join_error) => {
                error!("Handler for {} failed: {}", method, join_error);
                Err(RpcError::internal(format!("handler for '{method}' failed")))
            }
        };

        CallOutcome::new(id, result)
    }

    /// Web3-provider style entry point: `callback` receives the error view
    /// and the envelope view of the same outcome.
    pub async fn send<F>(&self, request: JsonRpcRequest, callback: F)
    where
        F: FnOnce(Option<&RpcError>, &JsonRpcResponse),
    {
        let outcome = self.dispatch(request).await;
        let response = outcome.response();
        callback(outcome.error(), &response);
    }

    async fn route(&self, request: JsonRpcRequest) -> Result<Value, RpcError> {
        let params = &request.params;
        match request.method.as_str() {
            "eth_accounts" => to_result(self.state_cache.provisioned_accounts().await),
            "eth_getBalance" => {
                let address = parse_address("address", param(params, 0)?)?;
                to_result(self.state_cache.get_balance(&address).await)
            }
            "eth_getTransactionCount" => {
                let address = parse_address("address", param(params, 0)?)?;
                to_result(U64::from(self.state_cache.get_nonce(&address).await))
            }
            "eth_sendTransaction" => self.send_transaction(params).await,
            "eth_getTransactionReceipt" => {
                let hash = parse_hash("hash", param(params, 0)?)?;
                to_result(self.receipts.get(&hash).await)
            }
            "eth_chainId" => to_result(U64::from(self.chain.chain_id)),
            "net_version" => Ok(Value::String(self.chain.network_id.to_string())),
            "eth_gasPrice" => to_result(U256::from(self.default_gas_price)),
            "web3_clientVersion" => Ok(Value::String(format!(
                "devnode/v{}",
                env!("CARGO_PKG_VERSION")
            ))),
            method => Err(RpcError::method_not_found(method)),
        }
    }

    /// Normalize, validate and commit one submission.
    ///
    /// The sender's lock is held from validation until the receipt is
    /// stored. Any rejection returns before the store is written.
    async fn send_transaction(&self, params: &Value) -> Result<Value, RpcError> {
        let request = self.normalizer.normalize(params).map_err(rejected)?;

        self.state_cache
            .with_sender_lock(request.from, self.validate_and_commit(&request))
            .await
    }

    async fn validate_and_commit(&self, request: &TransactionRequest) -> Result<Value, RpcError> {
        let tx = self.validator.validate(request).await.map_err(rejected)?;
        let tx_hash = tx.hash();
        debug!("Processing transaction {:?} from {:?}", tx_hash, tx.from);

        let execution = self
            .state_cache
            .commit(|accounts| self.executor.execute(accounts, &tx))
            .await
            .map_err(|execution_error| {
                warn!(
                    "Transaction {:?} failed to execute: {}",
                    tx_hash, execution_error
                );
                RpcError::from(execution_error)
            })?;

        self.receipts
            .store(TransactionReceipt {
                transaction_hash: tx_hash,
                from: tx.from,
                to: tx.to,
                contract_address: execution.contract_address,
                nonce: U64::from(tx.nonce),
                gas_used: execution.gas_used,
                effective_gas_price: tx.gas_price,
                status: U64::one(),
                timestamp: chrono::Utc::now().timestamp() as u64,
            })
            .await;

        info!(
            "Committed transaction {:?} from {:?} with nonce {}",
            tx_hash, tx.from, tx.nonce
        );
        to_result(tx_hash)
    }
}

fn rejected(error: ValidationError) -> RpcError {
    warn!("Rejected transaction ({}): {}", error.kind().as_str(), error);
    RpcError::from(error)
}

/// Positional parameter `index`
fn param(params: &Value, index: usize) -> Result<&Value, RpcError> {
    match params {
        Value::Array(values) => values
            .get(index)
            .ok_or_else(|| RpcError::invalid_params(format!("missing parameter {index}"))),
        other => Err(RpcError::invalid_params(format!(
            "expected an array, got {}",
            describe(other)
        ))),
    }
}

fn to_result<T: Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(RpcError::internal)
}
