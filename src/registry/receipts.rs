//! Receipt Registry
//!
//! In-memory store of transaction receipts, keyed by transaction hash.
//! Lives for the process's duration; nothing is persisted.

use crate::TransactionReceipt;
use ethers::types::H256;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct ReceiptRegistry {
    receipts: Arc<RwLock<HashMap<H256, TransactionReceipt>>>,
}

impl ReceiptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the receipt of a committed transaction
    pub async fn store(&self, receipt: TransactionReceipt) {
        let mut receipts = self.receipts.write().await;
        receipts.insert(receipt.transaction_hash, receipt);
    }

    pub async fn get(&self, hash: &H256) -> Option<TransactionReceipt> {
        let receipts = self.receipts.read().await;
        receipts.get(hash).cloned()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.receipts.read().await.len()
    }
}
