//! State Management Module
//!
//! This module provides the in-memory account state store.
//! The store holds account balances and nonces, and changes them only
//! through atomic commits of validated transactions.

mod cache;
pub use cache::{AccountTable, StateCache, StateDiff};
