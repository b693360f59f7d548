use crate::{TransactionRequest, ValidatedTransaction, ValidationError, state::StateCache};
use ethers::types::{U256, U512};
use tracing::{debug, warn};

/// Transaction validator
///
/// Sequential gate applied to a shape-checked request: nonce first, then
/// upfront cost against balance. Only reads state.
#[derive(Clone)]
pub struct Validator {
    state_cache: StateCache,
}

impl Validator {
    pub fn new(state_cache: StateCache) -> Self {
        Self { state_cache }
    }

    /// Validate a transaction request
    /// Returns the admitted transaction with its nonce resolved, or the first
    /// rule it breaks
    pub async fn validate(
        &self,
        request: &TransactionRequest,
    ) -> Result<ValidatedTransaction, ValidationError> {
        debug!("Validating transaction from {:?}", request.from);
        let account = self.state_cache.account(&request.from).await;

        // 1. Check nonce
        let nonce = check_nonce(request, account.nonce)?;

        // 2. Check balance
        check_balance(request, account.balance)?;

        debug!("Transaction validation successful");
        Ok(ValidatedTransaction {
            from: request.from,
            to: request.to,
            value: request.value,
            gas_limit: request.gas_limit,
            gas_price: request.gas_price,
            data: request.data.clone(),
            nonce,
        })
    }
}

/// Resolve the nonce the transaction will use.
/// An explicit nonce has to equal the account's exactly; an omitted one
/// adopts it.
fn check_nonce(request: &TransactionRequest, account_nonce: u64) -> Result<u64, ValidationError> {
    match request.nonce {
        None => Ok(account_nonce),
        Some(tx_nonce) if tx_nonce == account_nonce => Ok(tx_nonce),
        Some(tx_nonce) => {
            warn!(
                "Nonce check failed for {:?}: expected {}, got {}",
                request.from, account_nonce, tx_nonce
            );
            Err(ValidationError::NonceMismatch {
                account_nonce,
                tx_nonce,
            })
        }
    }
}

/// Upfront cost of a request: value + gas limit × gas price, widened to
/// 512 bits so no combination of 256-bit inputs overflows
pub fn upfront_cost(request: &TransactionRequest) -> U512 {
    request.gas_limit.full_mul(request.gas_price) + U512::from(request.value)
}

fn check_balance(request: &TransactionRequest, balance: U256) -> Result<(), ValidationError> {
    let cost = upfront_cost(request);

    if cost > U512::from(balance) {
        warn!(
            "Insufficient balance for {:?}: required {}, available {}",
            request.from, cost, balance
        );
        return Err(ValidationError::InsufficientFunds { cost, balance });
    }

    Ok(())
}
