//! Transaction Validation Module
//!
//! This module validates transaction submissions before they are committed.
//! The normalizer checks parameter shapes, then the validator checks the
//! nonce and the upfront cost against current account state.

mod normalizer;
mod validator;


pub use normalizer::{Normalizer, parse_address, parse_hash};
pub(crate) use normalizer::describe;
pub use validator::{Validator, upfront_cost};
