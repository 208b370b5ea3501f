//! Ledger store module
//!
//! Persistence abstraction for accounts and transactions. The engine talks
//! to an injected [`LedgerStore`] with scoped reads and a single atomic
//! `commit` for writes; [`pg::PgStore`] is the Postgres adapter and
//! [`memory::MemoryStore`] is an in-memory implementation of the same
//! contract used by tests.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Account, BalanceChange, Transaction, TransactionType};

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Store-level errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A write in a unit of work targeted a record that does not exist.
    #[error("Record not found: {0}")]
    RecordNotFound(Uuid),

    /// A stored value failed to map back into a domain type.
    #[error("Invalid stored value: {0}")]
    Decode(String),

    #[error("Commit failed: {0}")]
    CommitFailed(String),
}

/// Caller's role within an organization, as reported by the membership
/// lookup. Role gating itself happens at the API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Member,
    Viewer,
}

impl Role {
    pub fn can_write(&self) -> bool {
        matches!(self, Role::Admin | Role::Member)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "member" => Some(Role::Member),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

/// Filters for listing transactions (all optional, combined with AND).
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Matches either endpoint of the transaction.
    pub account_id: Option<Uuid>,
    pub tx_type: Option<TransactionType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Case-insensitive substring match.
    pub category: Option<String>,
}

/// A single write inside a unit of work.
///
/// `AdjustBalance` is applied as an atomic in-place increment on the stored
/// value, never as read-modify-write, so concurrent units of work touching
/// the same account cannot lose updates.
#[derive(Debug, Clone)]
pub enum StoreWrite {
    InsertAccount(Account),
    UpdateAccount(Account),
    DeleteAccount { account_id: Uuid },
    InsertTransaction(Transaction),
    UpdateTransaction(Transaction),
    DeleteTransaction { transaction_id: Uuid },
    AdjustBalance { account_id: Uuid, delta: Decimal },
}

/// An ordered batch of writes that either all persist or none do.
///
/// This is how a transaction record and its balance effect stay in
/// lock-step: both go into one unit, so the store never observes a record
/// without its matching balance change (or vice versa).
#[derive(Debug, Clone, Default)]
pub struct UnitOfWork {
    writes: Vec<StoreWrite>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_account(mut self, account: Account) -> Self {
        self.writes.push(StoreWrite::InsertAccount(account));
        self
    }

    pub fn update_account(mut self, account: Account) -> Self {
        self.writes.push(StoreWrite::UpdateAccount(account));
        self
    }

    pub fn delete_account(mut self, account_id: Uuid) -> Self {
        self.writes.push(StoreWrite::DeleteAccount { account_id });
        self
    }

    pub fn insert_transaction(mut self, transaction: Transaction) -> Self {
        self.writes.push(StoreWrite::InsertTransaction(transaction));
        self
    }

    pub fn update_transaction(mut self, transaction: Transaction) -> Self {
        self.writes.push(StoreWrite::UpdateTransaction(transaction));
        self
    }

    pub fn delete_transaction(mut self, transaction_id: Uuid) -> Self {
        self.writes
            .push(StoreWrite::DeleteTransaction { transaction_id });
        self
    }

    pub fn adjust_balances(mut self, changes: Vec<BalanceChange>) -> Self {
        for change in changes {
            self.writes.push(StoreWrite::AdjustBalance {
                account_id: change.account_id,
                delta: change.delta,
            });
        }
        self
    }

    pub fn writes(&self) -> &[StoreWrite] {
        &self.writes
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Persistence contract for the ledger engine.
///
/// All reads are scoped by organization id: an id that exists but belongs
/// to a different organization behaves identically to a missing id. This
/// tenant-isolation rule is part of the contract, not an implementation
/// detail of any one adapter.
#[async_trait]
pub trait LedgerStore: Clone + Send + Sync + 'static {
    async fn get_account(
        &self,
        org_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<Account>, StoreError>;

    async fn list_accounts(&self, org_id: Uuid) -> Result<Vec<Account>, StoreError>;

    /// Whether an account with this name already exists in the
    /// organization, excluding `exclude` (used when renaming).
    async fn account_name_taken(
        &self,
        org_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError>;

    async fn get_transaction(
        &self,
        org_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<Transaction>, StoreError>;

    async fn list_transactions(
        &self,
        org_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// Number of live transactions referencing this account from either
    /// endpoint. Gate for account deletion.
    async fn transaction_reference_count(&self, account_id: Uuid) -> Result<i64, StoreError>;

    /// Apply a unit of work atomically: either every write persists or
    /// none do, including under a crash mid-unit.
    async fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountType;

    #[test]
    fn test_unit_of_work_preserves_write_order() {
        let account = Account::new(
            Uuid::new_v4(),
            "Cash".to_string(),
            AccountType::Asset,
            None,
            None,
            None,
        );
        let account_id = account.id;

        let unit = UnitOfWork::new()
            .insert_account(account)
            .adjust_balances(vec![BalanceChange {
                account_id,
                delta: Decimal::ONE,
            }]);

        assert_eq!(unit.writes().len(), 2);
        assert!(matches!(unit.writes()[0], StoreWrite::InsertAccount(_)));
        assert!(matches!(unit.writes()[1], StoreWrite::AdjustBalance { .. }));
    }

    #[test]
    fn test_role_gating() {
        assert!(Role::Admin.can_write());
        assert!(Role::Member.can_write());
        assert!(!Role::Viewer.can_write());
        assert_eq!(Role::parse("viewer"), Some(Role::Viewer));
        assert_eq!(Role::parse("owner"), None);
    }
}
