//! This crate implements a local simulated blockchain node served over JSON-RPC.
//! It includes modules for data types, the API surface, parameter and transaction
//! validation, account state, execution, receipts, account provisioning and configuration.

pub mod types; // Defines common data structures and error types used throughout the node.
pub mod api; // JSON-RPC dispatcher, envelopes and the HTTP server.
pub mod validation; // Parameter shape checks and nonce/balance validation.
pub mod state; // Account state store.
pub mod execution; // Applies validated transactions to account state.
pub mod registry; // Receipts of committed transactions.
pub mod genesis; // Funded accounts provisioned at startup.
pub mod config; // Defines and loads node configuration.

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use api::Dispatcher;
