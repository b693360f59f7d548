//! Execution Module
//!
//! This module commits validated transactions:
//! - `Executor`: the interface the dispatcher calls after validation
//! - `TransferExecutor`: value transfers and creations, intrinsic gas only

mod executor;

pub use executor::{Execution, Executor, TransferExecutor, intrinsic_gas};
