//! Transaction Validator
//!
//! Decides whether a proposed transaction is well-formed before any balance
//! mutation happens. Read-only with respect to the store; the lifecycle
//! manager re-runs it in full whenever type, amount or endpoints change
//! during an update.
//!
//! Rules, first failure wins:
//! 1. amount strictly positive — enforced before this point by `Amount`
//!    construction, so a non-positive amount can never reach the validator;
//! 2. endpoint shape matches the transaction type (pure check);
//! 3. every populated endpoint resolves to an account in the calling
//!    organization;
//! 4. every resolved account is active (a distinct rejection from "not
//!    found", naming the account).

use uuid::Uuid;

use crate::domain::{check_endpoints, Account, Amount, DomainError, TransactionType};
use crate::error::{AppError, AppResult};
use crate::store::LedgerStore;

pub struct TransactionValidator<'a, S> {
    store: &'a S,
    org_id: Uuid,
}

impl<'a, S: LedgerStore> TransactionValidator<'a, S> {
    pub fn new(store: &'a S, org_id: Uuid) -> Self {
        Self { store, org_id }
    }

    /// Validate the proposed (type, amount, endpoints) combination.
    ///
    /// `_amount` is part of the contract even though its positivity is
    /// already guaranteed by construction.
    pub async fn validate(
        &self,
        tx_type: TransactionType,
        _amount: &Amount,
        from_account_id: Option<Uuid>,
        to_account_id: Option<Uuid>,
    ) -> AppResult<()> {
        check_endpoints(tx_type, from_account_id, to_account_id)?;

        // Resolve every endpoint before any active check, so "not found"
        // always wins over "inactive".
        let mut resolved: Vec<Account> = Vec::with_capacity(2);
        for account_id in [from_account_id, to_account_id].into_iter().flatten() {
            let account = self
                .store
                .get_account(self.org_id, account_id)
                .await?
                .ok_or(AppError::AccountNotFound(account_id))?;
            resolved.push(account);
        }

        for account in resolved {
            if !account.is_active {
                return Err(DomainError::AccountInactive { name: account.name }.into());
            }
        }

        Ok(())
    }
}
