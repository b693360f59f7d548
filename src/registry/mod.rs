//! Receipt Registry Module
//!
//! This module keeps a receipt for every committed transaction so callers
//! can look them up by hash.

mod receipts;
pub use receipts::ReceiptRegistry;
