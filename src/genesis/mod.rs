//! Genesis Module
//!
//! This module provisions the funded accounts the node starts with.
//! Keys are derived deterministically from the configured seed, so the
//! same configuration always yields the same addresses.

mod accounts;
pub use accounts::{derive_accounts, provision};
