use ethers::types::{Address, Bytes, H256, U256, U512, U64};
use ethers::utils::keccak256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub address: Address,
    pub balance: U256,
    pub nonce: u64,
}

impl AccountState {
    /// State of an address nothing has been committed to yet
    pub fn empty(address: Address) -> Self {
        Self {
            address,
            balance: U256::zero(),
            nonce: 0,
        }
    }
}

/// Transaction submitted through `eth_sendTransaction`, after shape checks
/// and defaulting but before any state comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    /// `None` denotes a creation-style transaction
    pub to: Option<Address>,
    pub value: U256,
    pub gas_limit: U256,
    pub gas_price: U256,
    pub data: Bytes,
    /// When present it must equal the sender's current nonce exactly
    pub nonce: Option<u64>,
}

/// A request the validator admitted, with its nonce resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransaction {
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub gas_limit: U256,
    pub gas_price: U256,
    pub data: Bytes,
    pub nonce: u64,
}

impl ValidatedTransaction {
    /// Compute the hash identifying the transaction
    pub fn hash(&self) -> H256 {
        let mut data = Vec::new();
        data.extend_from_slice(self.from.as_bytes());
        // Tagged so a creation never encodes like a call
        match self.to {
            Some(to) => {
                data.push(1);
                data.extend_from_slice(to.as_bytes());
            }
            None => data.push(0),
        }

        for quantity in [self.value, self.gas_limit, self.gas_price] {
            let mut bytes = [0u8; 32];
            quantity.to_big_endian(&mut bytes);
            data.extend_from_slice(&bytes);
        }

        data.extend_from_slice(&self.nonce.to_be_bytes());
        data.extend_from_slice(&self.data);

        H256::from_slice(&keccak256(data))
    }
}

/// Record of a committed transaction, served by `eth_getTransactionReceipt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: H256,
    pub from: Address,
    pub to: Option<Address>,
    pub contract_address: Option<Address>,
    pub nonce: U64,
    pub gas_used: U256,
    pub effective_gas_price: U256,
    pub status: U64,
    pub timestamp: u64,
}

/// Category of a rejected submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    InvalidParameterShape,
    NonceMismatch,
    InsufficientFunds,
}

impl RejectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::InvalidParameterShape => "InvalidParameterShape",
            RejectionKind::NonceMismatch => "NonceMismatch",
            RejectionKind::InsufficientFunds => "InsufficientFunds",
        }
    }
}

/// Validation errors
///
/// The display text is what callers see in both error surfaces, so the
/// nonce and funds messages must not change.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid `{field}` parameter: {reason}")]
    InvalidParameterShape { field: &'static str, reason: String },
    #[error(
        "the tx doesn't have the correct nonce. account has nonce of: {account_nonce} tx has nonce of: {tx_nonce}"
    )]
    NonceMismatch { account_nonce: u64, tx_nonce: u64 },
    #[error(
        "sender doesn't have enough funds to send tx. The upfront cost is: {cost} and the sender's account only has: {balance}"
    )]
    InsufficientFunds { cost: U512, balance: U256 },
}

impl ValidationError {
    pub fn shape(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidParameterShape {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> RejectionKind {
        match self {
            ValidationError::InvalidParameterShape { .. } => RejectionKind::InvalidParameterShape,
            ValidationError::NonceMismatch { .. } => RejectionKind::NonceMismatch,
            ValidationError::InsufficientFunds { .. } => RejectionKind::InsufficientFunds,
        }
    }
}

/// Failures raised while applying an already validated transaction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("intrinsic gas too low: the tx needs {required} gas but its limit is {limit}")]
    IntrinsicGas { required: u64, limit: U256 },
    #[error("sender doesn't have enough funds to pay for execution. The cost is: {cost} and the sender's account only has: {balance}")]
    InsufficientBalance { cost: U256, balance: U256 },
    #[error("balance overflow while crediting {0:?}")]
    BalanceOverflow(Address),
}
