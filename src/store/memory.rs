//! In-memory ledger store
//!
//! Implements the same [`LedgerStore`] contract as the Postgres adapter,
//! with all-or-nothing commits: a unit of work is applied to a copy of the
//! state and only swapped in if every write succeeds. Used by the engine's
//! tests; `fail_next_commit` lets a test force a commit failure and assert
//! that no partial state is observable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Account, Transaction};

use super::{LedgerStore, StoreError, StoreWrite, TransactionFilter, UnitOfWork};

#[derive(Debug, Default, Clone)]
struct State {
    accounts: HashMap<Uuid, Account>,
    transactions: HashMap<Uuid, Transaction>,
}

/// In-memory store; cheap to clone, shares state between clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    fail_next_commit: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `commit` fail without applying anything.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means a test thread panicked; the state
        // itself is still a consistent committed snapshot.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn apply(state: &mut State, write: &StoreWrite) -> Result<(), StoreError> {
        match write {
            StoreWrite::InsertAccount(account) => {
                state.accounts.insert(account.id, account.clone());
            }
            StoreWrite::UpdateAccount(account) => {
                let existing = state
                    .accounts
                    .get(&account.id)
                    .ok_or(StoreError::RecordNotFound(account.id))?;
                // Balances move only through AdjustBalance; a record update
                // must not overwrite one with a stale snapshot.
                let mut updated = account.clone();
                updated.balance = existing.balance;
                state.accounts.insert(account.id, updated);
            }
            StoreWrite::DeleteAccount { account_id } => {
                if state.accounts.remove(account_id).is_none() {
                    return Err(StoreError::RecordNotFound(*account_id));
                }
            }
            StoreWrite::InsertTransaction(transaction) => {
                state
                    .transactions
                    .insert(transaction.id, transaction.clone());
            }
            StoreWrite::UpdateTransaction(transaction) => {
                if !state.transactions.contains_key(&transaction.id) {
                    return Err(StoreError::RecordNotFound(transaction.id));
                }
                state
                    .transactions
                    .insert(transaction.id, transaction.clone());
            }
            StoreWrite::DeleteTransaction { transaction_id } => {
                if state.transactions.remove(transaction_id).is_none() {
                    return Err(StoreError::RecordNotFound(*transaction_id));
                }
            }
            StoreWrite::AdjustBalance { account_id, delta } => {
                let account = state
                    .accounts
                    .get_mut(account_id)
                    .ok_or(StoreError::RecordNotFound(*account_id))?;
                account.balance += delta;
            }
        }
        Ok(())
    }

    fn matches(filter: &TransactionFilter, tx: &Transaction) -> bool {
        if let Some(account_id) = filter.account_id {
            if tx.from_account_id != Some(account_id) && tx.to_account_id != Some(account_id) {
                return false;
            }
        }
        if let Some(tx_type) = filter.tx_type {
            if tx.tx_type != tx_type {
                return false;
            }
        }
        if let Some(start) = filter.start_date {
            if tx.date < start {
                return false;
            }
        }
        if let Some(end) = filter.end_date {
            if tx.date > end {
                return false;
            }
        }
        if let Some(ref category) = filter.category {
            let needle = category.to_lowercase();
            match tx.category {
                Some(ref c) if c.to_lowercase().contains(&needle) => {}
                _ => return false,
            }
        }
        true
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_account(
        &self,
        org_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<Account>, StoreError> {
        let state = self.lock();
        Ok(state
            .accounts
            .get(&account_id)
            .filter(|a| a.organization_id == org_id)
            .cloned())
    }

    async fn list_accounts(&self, org_id: Uuid) -> Result<Vec<Account>, StoreError> {
        let state = self.lock();
        let mut accounts: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| a.organization_id == org_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn account_name_taken(
        &self,
        org_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let state = self.lock();
        Ok(state.accounts.values().any(|a| {
            a.organization_id == org_id && a.name == name && Some(a.id) != exclude
        }))
    }

    async fn get_transaction(
        &self,
        org_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<Transaction>, StoreError> {
        let state = self.lock();
        Ok(state
            .transactions
            .get(&transaction_id)
            .filter(|t| t.organization_id == org_id)
            .cloned())
    }

    async fn list_transactions(
        &self,
        org_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError> {
        let state = self.lock();
        let mut transactions: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|t| t.organization_id == org_id && Self::matches(filter, t))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(transactions)
    }

    async fn transaction_reference_count(&self, account_id: Uuid) -> Result<i64, StoreError> {
        let state = self.lock();
        Ok(state
            .transactions
            .values()
            .filter(|t| {
                t.from_account_id == Some(account_id) || t.to_account_id == Some(account_id)
            })
            .count() as i64)
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError> {
        let mut state = self.lock();

        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::CommitFailed(
                "injected commit failure".to_string(),
            ));
        }

        // Apply to a copy; swap in only if every write succeeded.
        let mut staged = state.clone();
        for write in unit.writes() {
            Self::apply(&mut staged, write)?;
        }
        *state = staged;
        Ok(())
    }
}
