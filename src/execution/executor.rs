//! Executor Module
//!
//! Applies the effects of a validated transaction. An executor never writes
//! to the store itself: it reads a snapshot of the accounts and describes the
//! new state of every account it touches, which the store then applies in
//! one step.

use crate::{
    AccountState, ExecutionError, ValidatedTransaction,
    state::{AccountTable, StateDiff},
};
use ethers::types::{Address, U256};
use ethers::utils::get_contract_address;

/// Base cost of every transaction
pub const TX_GAS: u64 = 21_000;
/// Extra cost of a transaction without a recipient
pub const TX_CREATE_GAS: u64 = 32_000;
pub const TX_DATA_ZERO_GAS: u64 = 4;
pub const TX_DATA_NON_ZERO_GAS: u64 = 16;

/// What a commit produced besides the state changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub gas_used: U256,
    /// Address credited by a creation-style transaction
    pub contract_address: Option<Address>,
}

/// Applies a validated transaction to account state
pub trait Executor: Send + Sync {
    /// Compute the state changes of `tx` against `accounts`.
    ///
    /// Called with the store's write lock held, after validation succeeded.
    fn execute(
        &self,
        accounts: &AccountTable,
        tx: &ValidatedTransaction,
    ) -> Result<(StateDiff, Execution), ExecutionError>;
}

/// Gas charged before any code would run
pub fn intrinsic_gas(tx: &ValidatedTransaction) -> u64 {
    let base = if tx.to.is_none() {
        TX_GAS + TX_CREATE_GAS
    } else {
        TX_GAS
    };

    tx.data.iter().fold(base, |gas, byte| {
        gas + if *byte == 0 {
            TX_DATA_ZERO_GAS
        } else {
            TX_DATA_NON_ZERO_GAS
        }
    })
}

/// Value transfer executor
///
/// Charges intrinsic gas only, debits the sender, bumps its nonce and
/// credits the recipient (or the derived contract address for creations).
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferExecutor;

impl Executor for TransferExecutor {
    fn execute(
        &self,
        accounts: &AccountTable,
        tx: &ValidatedTransaction,
    ) -> Result<(StateDiff, Execution), ExecutionError> {
        let required = intrinsic_gas(tx);
        let gas_used = U256::from(required);
        if gas_used > tx.gas_limit {
            return Err(ExecutionError::IntrinsicGas {
                required,
                limit: tx.gas_limit,
            });
        }

        let load = |address: Address| {
            accounts
                .get(&address)
                .cloned()
                .unwrap_or_else(|| AccountState::empty(address))
        };

        let cost = gas_used.saturating_mul(tx.gas_price).saturating_add(tx.value);
        let mut sender = load(tx.from);
        sender.balance = sender
            .balance
            .checked_sub(cost)
            .ok_or(ExecutionError::InsufficientBalance {
                cost,
                balance: sender.balance,
            })?;
        sender.nonce += 1;

        let (recipient_address, contract_address) = match tx.to {
            Some(to) => (to, None),
            None => {
                let created = get_contract_address(tx.from, tx.nonce);
                (created, Some(created))
            }
        };

        let updates = if recipient_address == tx.from {
            sender.balance = credit(sender.balance, tx.value, tx.from)?;
            vec![sender]
        } else {
            let mut recipient = load(recipient_address);
            recipient.balance = credit(recipient.balance, tx.value, recipient_address)?;
            vec![sender, recipient]
        };

        Ok((
            StateDiff { updates },
            Execution {
                gas_used,
                contract_address,
            },
        ))
    }
}

fn credit(balance: U256, value: U256, address: Address) -> Result<U256, ExecutionError> {
    balance
        .checked_add(value)
        .ok_or(ExecutionError::BalanceOverflow(address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::Bytes;

    fn account(byte: u8, balance: u64, nonce: u64) -> AccountState {
        AccountState {
            address: Address::repeat_byte(byte),
            balance: U256::from(balance),
            nonce,
        }
    }

    fn table(states: Vec<AccountState>) -> AccountTable {
        states.into_iter().map(|s| (s.address, s)).collect()
    }

    fn transfer(value: u64, gas_price: u64) -> ValidatedTransaction {
        ValidatedTransaction {
            from: Address::repeat_byte(1),
            to: Some(Address::repeat_byte(2)),
            value: U256::from(value),
            gas_limit: U256::from(100_000),
            gas_price: U256::from(gas_price),
            data: Bytes::default(),
            nonce: 0,
        }
    }

    #[test]
    fn test_intrinsic_gas_counts_data_bytes() {
        let mut tx = transfer(0, 1);
        tx.data = Bytes::from(vec![0u8, 0, 1, 2]);
        assert_eq!(intrinsic_gas(&tx), 21_000 + 2 * 4 + 2 * 16);

        tx.to = None;
        assert_eq!(intrinsic_gas(&tx), 53_000 + 2 * 4 + 2 * 16);
    }

    #[test]
    fn test_transfer_moves_value_and_charges_gas_used() {
        let accounts = table(vec![account(1, 1_000_000, 0)]);
        let (diff, execution) = TransferExecutor.execute(&accounts, &transfer(500, 2)).unwrap();

        assert_eq!(execution.gas_used, U256::from(21_000));
        assert_eq!(execution.contract_address, None);
        assert_eq!(
            diff.updates,
            vec![account(1, 1_000_000 - 500 - 42_000, 1), account(2, 500, 0)]
        );
    }

    #[test]
    fn test_self_transfer_only_pays_gas() {
        let accounts = table(vec![account(1, 100_000, 4)]);
        let mut tx = transfer(700, 1);
        tx.to = Some(Address::repeat_byte(1));
        tx.nonce = 4;

        let (diff, _) = TransferExecutor.execute(&accounts, &tx).unwrap();
        assert_eq!(diff.updates, vec![account(1, 100_000 - 21_000, 5)]);
    }

    #[test]
    fn test_creation_credits_derived_address() {
        let accounts = table(vec![account(1, 1_000_000, 0)]);
        let mut tx = transfer(10, 0);
        tx.to = None;

        let (diff, execution) = TransferExecutor.execute(&accounts, &tx).unwrap();
        let created = get_contract_address(Address::repeat_byte(1), 0u64);
        assert_eq!(execution.contract_address, Some(created));
        assert_eq!(diff.updates[1].address, created);
        assert_eq!(diff.updates[1].balance, U256::from(10));
    }

    #[test]
    fn test_gas_limit_below_intrinsic_gas() {
        let accounts = table(vec![account(1, 1_000_000, 0)]);
        let mut tx = transfer(0, 1);
        tx.gas_limit = U256::from(20_999);

        assert_eq!(
            TransferExecutor.execute(&accounts, &tx),
            Err(ExecutionError::IntrinsicGas {
                required: 21_000,
                limit: U256::from(20_999)
            })
        );
    }

    #[test]
    fn test_recipient_overflow_is_an_error() {
        let mut rich = account(2, 0, 0);
        rich.balance = U256::MAX;
        let accounts = table(vec![account(1, 1_000_000, 0), rich]);

        assert_eq!(
            TransferExecutor.execute(&accounts, &transfer(1, 0)),
            Err(ExecutionError::BalanceOverflow(Address::repeat_byte(2)))
        );
    }
}
