//! Configuration Module
//!
//! This module defines all configuration structures for the node.
//! Configuration is loaded from TOML files and parsed using serde.
//! Every section falls back to its defaults, so a partial file is valid.

use serde::Deserialize;
use std::fs;

/// Main configuration structure
///
/// # Example TOML
/// ```toml
/// [api]
/// host = "127.0.0.1"
/// port = 8545
///
/// [chain]
/// chain_id = 1337
/// network_id = 5777
///
/// [accounts]
/// count = 10
/// balance_ether = 100
/// seed = "devnode"
///
/// [gas]
/// default_gas_limit = 90000
/// default_gas_price = 20000000000
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub chain: ChainConfig,
    pub accounts: AccountsConfig,
    pub gas: GasConfig,
}

/// API server configuration
///
/// # Fields
/// - `host`: IP address to bind to (e.g., "127.0.0.1" or "0.0.0.0")
/// - `port`: TCP port to listen on (e.g., 8545)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8545,
        }
    }
}

/// Chain identity reported by `eth_chainId` and `net_version`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub network_id: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 1337,
            network_id: 5777,
        }
    }
}

/// Accounts provisioned at startup
///
/// # Fields
/// - `count`: Number of funded accounts to derive
/// - `balance_ether`: Starting balance of each account, in ether
/// - `seed`: Input to the deterministic key derivation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    pub count: usize,
    pub balance_ether: u64,
    pub seed: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            count: 10,
            balance_ether: 100,
            seed: "devnode".to_string(),
        }
    }
}

/// Values used when a submitted transaction omits `gas` or `gasPrice`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    pub default_gas_limit: u64,
    /// In wei
    pub default_gas_price: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            default_gas_limit: 90_000,
            default_gas_price: 20_000_000_000,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
