use crate::AccountState;
use ethers::types::{Address, U256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Read-only view of every account the store knows about
pub type AccountTable = HashMap<Address, AccountState>;

/// New states of every account a commit touches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDiff {
    pub updates: Vec<AccountState>,
}

/// In-memory account state store.
///
/// Cloning is cheap and every clone shares the same accounts. Writes only
/// happen through [`StateCache::provision`] at startup and
/// [`StateCache::commit`].
#[derive(Clone, Default)]
pub struct StateCache {
    accounts: Arc<RwLock<AccountTable>>,
    /// Provisioned addresses in provisioning order
    provisioned: Arc<RwLock<Vec<Address>>>,
    /// One single-writer lock per sending address
    sender_locks: Arc<Mutex<HashMap<Address, Arc<Mutex<()>>>>>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed funded accounts. Addresses already present are overwritten but
    /// keep their original position in the provisioning order.
    pub async fn provision(&self, states: Vec<AccountState>) {
        let mut accounts = self.accounts.write().await;
        let mut provisioned = self.provisioned.write().await;
        for state in states {
            if !provisioned.contains(&state.address) {
                provisioned.push(state.address);
            }
            accounts.insert(state.address, state);
        }
    }

    pub async fn provisioned_accounts(&self) -> Vec<Address> {
        self.provisioned.read().await.clone()
    }

    /// Current state of an address; unknown addresses read as empty
    pub async fn account(&self, address: &Address) -> AccountState {
        let accounts = self.accounts.read().await;
        accounts
            .get(address)
            .cloned()
            .unwrap_or_else(|| AccountState::empty(*address))
    }

    pub async fn get_balance(&self, address: &Address) -> U256 {
        self.account(address).await.balance
    }

    pub async fn get_nonce(&self, address: &Address) -> u64 {
        self.account(address).await.nonce
    }

    /// Run `work` while holding the single-writer lock of a sender, so no
    /// other submission from the same address can interleave between its
    /// validation and its commit.
    ///
    /// The lock is dropped from the table once no other caller holds or
    /// waits on it, so senders that are seen once leave nothing behind.
    pub async fn with_sender_lock<T>(&self, address: Address, work: impl Future<Output = T>) -> T {
        let lock = {
            let mut locks = self.sender_locks.lock().await;
            locks.entry(address).or_default().clone()
        };

        let output = {
            let _guard = lock.lock().await;
            work.await
        };

        let mut locks = self.sender_locks.lock().await;
        // The table's handle plus ours
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&address);
        }
        output
    }

    #[cfg(test)]
    pub(crate) async fn sender_lock_count(&self) -> usize {
        self.sender_locks.lock().await.len()
    }

    /// Run `execute` against the accounts and apply the diff it returns,
    /// all under one write lock. When `execute` fails nothing is written.
    pub async fn commit<T, E, F>(&self, execute: F) -> Result<T, E>
    where
        F: FnOnce(&AccountTable) -> Result<(StateDiff, T), E>,
    {
        let mut accounts = self.accounts.write().await;
        let (diff, output) = execute(&accounts)?;
        for state in diff.updates {
            accounts.insert(state.address, state);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(byte: u8, balance: u64) -> AccountState {
        AccountState {
            address: Address::repeat_byte(byte),
            balance: U256::from(balance),
            nonce: 0,
        }
    }

    #[tokio::test]
    async fn test_unknown_account_reads_empty() {
        let cache = StateCache::new();
        let address = Address::repeat_byte(7);
        assert_eq!(cache.account(&address).await, AccountState::empty(address));
    }

    #[tokio::test]
    async fn test_provision_keeps_order() {
        let cache = StateCache::new();
        cache
            .provision(vec![funded(3, 10), funded(1, 20), funded(2, 30)])
            .await;
        cache.provision(vec![funded(1, 99)]).await;

        assert_eq!(
            cache.provisioned_accounts().await,
            vec![
                Address::repeat_byte(3),
                Address::repeat_byte(1),
                Address::repeat_byte(2)
            ]
        );
        assert_eq!(
            cache.get_balance(&Address::repeat_byte(1)).await,
            U256::from(99)
        );
    }

    #[tokio::test]
    async fn test_failed_commit_writes_nothing() {
        let cache = StateCache::new();
        cache.provision(vec![funded(1, 10)]).await;

        let result: Result<(), &str> = cache.commit(|_| Err("boom")).await;
        assert!(result.is_err());
        assert_eq!(cache.account(&Address::repeat_byte(1)).await, funded(1, 10));
    }

    #[tokio::test]
    async fn test_commit_applies_every_update() {
        let cache = StateCache::new();
        cache.provision(vec![funded(1, 10)]).await;

        let result: Result<u8, ()> = cache
            .commit(|accounts| {
                let mut sender = accounts[&Address::repeat_byte(1)].clone();
                sender.balance -= U256::from(4);
                sender.nonce += 1;
                let recipient = funded(2, 4);
                Ok((
                    StateDiff {
                        updates: vec![sender, recipient],
                    },
                    42,
                ))
            })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(cache.get_balance(&Address::repeat_byte(1)).await, U256::from(6));
        assert_eq!(cache.get_nonce(&Address::repeat_byte(1)).await, 1);
        assert_eq!(cache.get_balance(&Address::repeat_byte(2)).await, U256::from(4));
    }

    #[tokio::test]
    async fn test_sender_lock_is_exclusive_per_address() {
        let cache = StateCache::new();
        let (release, released) = tokio::sync::oneshot::channel::<()>();

        let holder = cache.clone();
        let holding = tokio::spawn(async move {
            holder
                .with_sender_lock(Address::repeat_byte(1), async {
                    released.await.ok();
                })
                .await
        });
        tokio::task::yield_now().await;

        // A different sender is not blocked.
        assert_eq!(
            cache.with_sender_lock(Address::repeat_byte(2), async { 7 }).await,
            7
        );

        let contender = cache.clone();
        let waiting = tokio::spawn(async move {
            contender
                .with_sender_lock(Address::repeat_byte(1), async {})
                .await
        });
        tokio::task::yield_now().await;
        assert!(!waiting.is_finished());

        release.send(()).unwrap();
        holding.await.unwrap();
        waiting.await.unwrap();
        assert_eq!(cache.sender_lock_count().await, 0);
    }

    #[tokio::test]
    async fn test_sender_locks_do_not_accumulate() {
        let cache = StateCache::new();
        for byte in 0..=255u8 {
            cache.with_sender_lock(Address::repeat_byte(byte), async {}).await;
        }
        assert_eq!(cache.sender_lock_count().await, 0);
    }
}
