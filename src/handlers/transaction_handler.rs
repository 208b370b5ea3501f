//! Transaction Lifecycle Manager
//!
//! Orchestrates create/update/delete of a transaction record together with
//! the matching balance mutation or reversal. Record change and balance
//! deltas always travel in one unit of work, so the store can never observe
//! a transaction without its effect or an effect without its transaction.

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{apply_effects, revert_effects, Amount, Transaction};
use crate::error::{AppError, AppResult};
use crate::store::{LedgerStore, TransactionFilter, UnitOfWork};

use super::{CreateTransactionCommand, TransactionValidator, UpdateTransactionCommand};

pub struct TransactionService<S> {
    store: S,
}

impl<S: LedgerStore> TransactionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a transaction and apply its balance effect atomically.
    pub async fn create(
        &self,
        org_id: Uuid,
        command: CreateTransactionCommand,
    ) -> AppResult<Transaction> {
        let amount: Amount = command.amount.parse()?;

        TransactionValidator::new(&self.store, org_id)
            .validate(
                command.tx_type,
                &amount,
                command.from_account_id,
                command.to_account_id,
            )
            .await?;

        let now = Utc::now();
        let transaction = Transaction {
            id: Uuid::new_v4(),
            organization_id: org_id,
            tx_type: command.tx_type,
            amount,
            currency: command.currency.unwrap_or_else(|| "USD".to_string()),
            description: command.description,
            category: command.category,
            tags: command.tags.unwrap_or_default(),
            date: command.date.unwrap_or(now),
            from_account_id: command.from_account_id,
            to_account_id: command.to_account_id,
            created_at: now,
            updated_at: now,
        };

        let unit = UnitOfWork::new()
            .insert_transaction(transaction.clone())
            .adjust_balances(apply_effects(&transaction));
        self.store.commit(unit).await?;

        tracing::info!(
            transaction_id = %transaction.id,
            organization_id = %org_id,
            tx_type = %transaction.tx_type,
            amount = %transaction.amount,
            "transaction created"
        );

        Ok(transaction)
    }

    pub async fn get(&self, org_id: Uuid, transaction_id: Uuid) -> AppResult<Transaction> {
        self.store
            .get_transaction(org_id, transaction_id)
            .await?
            .ok_or(AppError::TransactionNotFound(transaction_id))
    }

    pub async fn list(
        &self,
        org_id: Uuid,
        filter: &TransactionFilter,
    ) -> AppResult<Vec<Transaction>> {
        Ok(self.store.list_transactions(org_id, filter).await?)
    }

    /// Update a transaction. If the effect-bearing fields (type, amount,
    /// endpoints) change, the old effect is reverted with the values as
    /// they existed before the update and the new effect applied, all in
    /// the same unit of work as the record change.
    pub async fn update(
        &self,
        org_id: Uuid,
        transaction_id: Uuid,
        command: UpdateTransactionCommand,
    ) -> AppResult<Transaction> {
        let existing = self.get(org_id, transaction_id).await?;

        let tx_type = command.tx_type.unwrap_or(existing.tx_type);
        let amount: Amount = match command.amount {
            Some(raw) => raw.parse()?,
            None => existing.amount.clone(),
        };

        // A type change redefines which endpoints may exist, so the command
        // supplies them outright; otherwise omitted endpoints carry over.
        let (from_account_id, to_account_id) = if tx_type != existing.tx_type {
            (command.from_account_id, command.to_account_id)
        } else {
            (
                command.from_account_id.or(existing.from_account_id),
                command.to_account_id.or(existing.to_account_id),
            )
        };

        let effect_changed = tx_type != existing.tx_type
            || amount != existing.amount
            || from_account_id != existing.from_account_id
            || to_account_id != existing.to_account_id;

        if effect_changed {
            TransactionValidator::new(&self.store, org_id)
                .validate(tx_type, &amount, from_account_id, to_account_id)
                .await?;
        }

        let updated = Transaction {
            id: existing.id,
            organization_id: existing.organization_id,
            tx_type,
            amount,
            currency: command.currency.unwrap_or_else(|| existing.currency.clone()),
            description: command.description.or_else(|| existing.description.clone()),
            category: command.category.or_else(|| existing.category.clone()),
            tags: command.tags.unwrap_or_else(|| existing.tags.clone()),
            date: command.date.unwrap_or(existing.date),
            from_account_id,
            to_account_id,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        // Revert of the old effect uses `existing` exactly as loaded, never
        // the partially-updated record. Committing revert, record change
        // and re-apply as one unit means no reader ever observes the
        // transiently reverted balances.
        let mut unit = UnitOfWork::new();
        if effect_changed {
            unit = unit.adjust_balances(revert_effects(&existing));
        }
        unit = unit.update_transaction(updated.clone());
        if effect_changed {
            unit = unit.adjust_balances(apply_effects(&updated));
        }
        self.store.commit(unit).await?;

        tracing::info!(
            transaction_id = %updated.id,
            organization_id = %org_id,
            effect_changed,
            "transaction updated"
        );

        Ok(updated)
    }

    /// Delete a transaction, reverting its effect in the same unit of work
    /// that removes the record.
    pub async fn delete(&self, org_id: Uuid, transaction_id: Uuid) -> AppResult<()> {
        let existing = self.get(org_id, transaction_id).await?;

        let unit = UnitOfWork::new()
            .adjust_balances(revert_effects(&existing))
            .delete_transaction(existing.id);
        self.store.commit(unit).await?;

        tracing::info!(
            transaction_id = %existing.id,
            organization_id = %org_id,
            "transaction deleted"
        );

        Ok(())
    }
}
