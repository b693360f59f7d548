use crate::{AccountState, config::AccountsConfig, state::StateCache};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use ethers::utils::{keccak256, parse_ether};
use tracing::{debug, info};

/// Derive the funded accounts described by `config`.
///
/// The secret key of account `i` is `keccak256("{seed}:{i}")`.
pub fn derive_accounts(config: &AccountsConfig) -> anyhow::Result<Vec<AccountState>> {
    let balance = parse_ether(config.balance_ether)?;

    (0..config.count)
        .map(|index| -> anyhow::Result<AccountState> {
            let secret = keccak256(format!("{}:{}", config.seed, index));
            let wallet = LocalWallet::from_bytes(&secret)?;
            debug!("Derived account #{} {:?}", index, wallet.address());
            Ok(AccountState {
                address: wallet.address(),
                balance,
                nonce: 0,
            })
        })
        .collect()
}

/// Derive the configured accounts and seed them into the state cache
pub async fn provision(state_cache: &StateCache, config: &AccountsConfig) -> anyhow::Result<Vec<Address>> {
    let accounts = derive_accounts(config)?;
    let addresses = accounts.iter().map(|account| account.address).collect();
    state_cache.provision(accounts).await;
    info!("Provisioned {} accounts with {} ether each", config.count, config.balance_ether);
    Ok(addresses)
}
