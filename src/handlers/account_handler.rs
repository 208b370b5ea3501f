//! Account Service
//!
//! CRUD for accounts within an organization. Balances are never written
//! here: they start at zero and change only through transaction effects.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::Account;
use crate::error::{AppError, AppResult};
use crate::store::{LedgerStore, UnitOfWork};

use super::{CreateAccountCommand, UpdateAccountCommand};

pub struct AccountService<S> {
    store: S,
}

impl<S: LedgerStore> AccountService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(&self, org_id: Uuid, command: CreateAccountCommand) -> AppResult<Account> {
        if self
            .store
            .account_name_taken(org_id, &command.name, None)
            .await?
        {
            return Err(AppError::DuplicateAccountName(command.name));
        }

        let account = Account::new(
            org_id,
            command.name,
            command.account_type,
            command.currency,
            command.description,
            command.is_active,
        );

        self.store
            .commit(UnitOfWork::new().insert_account(account.clone()))
            .await?;

        tracing::info!(
            account_id = %account.id,
            organization_id = %org_id,
            "account created"
        );

        Ok(account)
    }

    pub async fn get(&self, org_id: Uuid, account_id: Uuid) -> AppResult<Account> {
        self.store
            .get_account(org_id, account_id)
            .await?
            .ok_or(AppError::AccountNotFound(account_id))
    }

    pub async fn list(&self, org_id: Uuid) -> AppResult<Vec<Account>> {
        Ok(self.store.list_accounts(org_id).await?)
    }

    pub async fn update(
        &self,
        org_id: Uuid,
        account_id: Uuid,
        command: UpdateAccountCommand,
    ) -> AppResult<Account> {
        let mut account = self.get(org_id, account_id).await?;

        if let Some(name) = command.name {
            if name != account.name
                && self
                    .store
                    .account_name_taken(org_id, &name, Some(account_id))
                    .await?
            {
                return Err(AppError::DuplicateAccountName(name));
            }
            account.name = name;
        }
        if let Some(account_type) = command.account_type {
            account.account_type = account_type;
        }
        if let Some(currency) = command.currency {
            account.currency = currency;
        }
        if let Some(description) = command.description {
            account.description = Some(description);
        }
        if let Some(is_active) = command.is_active {
            account.is_active = is_active;
        }
        account.updated_at = Utc::now();

        self.store
            .commit(UnitOfWork::new().update_account(account.clone()))
            .await?;

        Ok(account)
    }

    /// Delete an account. Hard precondition: no transaction may reference
    /// it from either endpoint; deletion never cascades.
    pub async fn delete(&self, org_id: Uuid, account_id: Uuid) -> AppResult<()> {
        let account = self.get(org_id, account_id).await?;

        let references = self.store.transaction_reference_count(account.id).await?;
        if references > 0 {
            return Err(AppError::AccountInUse {
                account_id: account.id,
                references,
            });
        }

        self.store
            .commit(UnitOfWork::new().delete_account(account.id))
            .await?;

        tracing::info!(
            account_id = %account.id,
            organization_id = %org_id,
            "account deleted"
        );

        Ok(())
    }
}
