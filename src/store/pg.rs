//! Postgres ledger store
//!
//! sqlx-backed implementation of [`LedgerStore`]. A unit of work maps to a
//! single database transaction; balance deltas are in-place increments
//! (`balance = balance + $n`) so the store serializes concurrent effects on
//! the same account without any read-modify-write round trip.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction as PgTransaction};
use uuid::Uuid;

use crate::domain::{Account, AccountType, Amount, Transaction, TransactionType};

use super::{LedgerStore, Role, StoreError, StoreWrite, TransactionFilter, UnitOfWork};

type AccountRow = (
    Uuid,              // id
    Uuid,              // organization_id
    String,            // name
    String,            // account_type
    Decimal,           // balance
    String,            // currency
    bool,              // is_active
    Option<String>,    // description
    DateTime<Utc>,     // created_at
    DateTime<Utc>,     // updated_at
);

type TransactionRow = (
    Uuid,              // id
    Uuid,              // organization_id
    String,            // type
    Decimal,           // amount
    String,            // currency
    Option<String>,    // description
    Option<String>,    // category
    Vec<String>,       // tags
    DateTime<Utc>,     // date
    Option<Uuid>,      // from_account_id
    Option<Uuid>,      // to_account_id
    DateTime<Utc>,     // created_at
    DateTime<Utc>,     // updated_at
);

const SELECT_ACCOUNT: &str = r#"
    SELECT id, organization_id, name, account_type, balance, currency,
           is_active, description, created_at, updated_at
    FROM accounts
"#;

const SELECT_TRANSACTION: &str = r#"
    SELECT id, organization_id, type, amount, currency, description,
           category, tags, date, from_account_id, to_account_id,
           created_at, updated_at
    FROM transactions
"#;

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for collaborators that query directly
    /// (schema checks, org-access middleware).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Caller's role within an organization, if any. This is the
    /// organization-access collaborator surface consumed by the API layer.
    pub async fn membership_role(
        &self,
        org_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Role>, StoreError> {
        let role: Option<String> = sqlx::query_scalar(
            r#"
            SELECT role FROM organization_members
            WHERE organization_id = $1 AND user_id = $2
            "#,
        )
        .bind(org_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match role {
            Some(raw) => Role::parse(&raw)
                .map(Some)
                .ok_or_else(|| StoreError::Decode(format!("unknown membership role '{}'", raw))),
            None => Ok(None),
        }
    }

    fn account_from_row(row: AccountRow) -> Result<Account, StoreError> {
        let (
            id,
            organization_id,
            name,
            account_type,
            balance,
            currency,
            is_active,
            description,
            created_at,
            updated_at,
        ) = row;

        Ok(Account {
            id,
            organization_id,
            name,
            account_type: account_type
                .parse::<AccountType>()
                .map_err(StoreError::Decode)?,
            balance,
            currency,
            is_active,
            description,
            created_at,
            updated_at,
        })
    }

    fn transaction_from_row(row: TransactionRow) -> Result<Transaction, StoreError> {
        let (
            id,
            organization_id,
            tx_type,
            amount,
            currency,
            description,
            category,
            tags,
            date,
            from_account_id,
            to_account_id,
            created_at,
            updated_at,
        ) = row;

        Ok(Transaction {
            id,
            organization_id,
            tx_type: tx_type
                .parse::<TransactionType>()
                .map_err(StoreError::Decode)?,
            amount: Amount::new(amount).map_err(|e| StoreError::Decode(e.to_string()))?,
            currency,
            description,
            category,
            tags,
            date,
            from_account_id,
            to_account_id,
            created_at,
            updated_at,
        })
    }

    async fn apply_write(
        tx: &mut PgTransaction<'_, Postgres>,
        write: &StoreWrite,
    ) -> Result<(), StoreError> {
        match write {
            StoreWrite::InsertAccount(account) => {
                sqlx::query(
                    r#"
                    INSERT INTO accounts (
                        id, organization_id, name, account_type, balance,
                        currency, is_active, description, created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                    "#,
                )
                .bind(account.id)
                .bind(account.organization_id)
                .bind(&account.name)
                .bind(account.account_type.as_str())
                .bind(account.balance)
                .bind(&account.currency)
                .bind(account.is_active)
                .bind(&account.description)
                .bind(account.created_at)
                .bind(account.updated_at)
                .execute(&mut **tx)
                .await?;
            }
            StoreWrite::UpdateAccount(account) => {
                // Balance is deliberately absent: it moves only through
                // AdjustBalance.
                let result = sqlx::query(
                    r#"
                    UPDATE accounts
                    SET name = $2, account_type = $3, currency = $4,
                        is_active = $5, description = $6, updated_at = $7
                    WHERE id = $1
                    "#,
                )
                .bind(account.id)
                .bind(&account.name)
                .bind(account.account_type.as_str())
                .bind(&account.currency)
                .bind(account.is_active)
                .bind(&account.description)
                .bind(account.updated_at)
                .execute(&mut **tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::RecordNotFound(account.id));
                }
            }
            StoreWrite::DeleteAccount { account_id } => {
                let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
                    .bind(account_id)
                    .execute(&mut **tx)
                    .await?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::RecordNotFound(*account_id));
                }
            }
            StoreWrite::InsertTransaction(transaction) => {
                sqlx::query(
                    r#"
                    INSERT INTO transactions (
                        id, organization_id, type, amount, currency, description,
                        category, tags, date, from_account_id, to_account_id,
                        created_at, updated_at
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                    "#,
                )
                .bind(transaction.id)
                .bind(transaction.organization_id)
                .bind(transaction.tx_type.as_str())
                .bind(transaction.amount.value())
                .bind(&transaction.currency)
                .bind(&transaction.description)
                .bind(&transaction.category)
                .bind(&transaction.tags)
                .bind(transaction.date)
                .bind(transaction.from_account_id)
                .bind(transaction.to_account_id)
                .bind(transaction.created_at)
                .bind(transaction.updated_at)
                .execute(&mut **tx)
                .await?;
            }
            StoreWrite::UpdateTransaction(transaction) => {
                let result = sqlx::query(
                    r#"
                    UPDATE transactions
                    SET type = $2, amount = $3, currency = $4, description = $5,
                        category = $6, tags = $7, date = $8,
                        from_account_id = $9, to_account_id = $10, updated_at = $11
                    WHERE id = $1
                    "#,
                )
                .bind(transaction.id)
                .bind(transaction.tx_type.as_str())
                .bind(transaction.amount.value())
                .bind(&transaction.currency)
                .bind(&transaction.description)
                .bind(&transaction.category)
                .bind(&transaction.tags)
                .bind(transaction.date)
                .bind(transaction.from_account_id)
                .bind(transaction.to_account_id)
                .bind(transaction.updated_at)
                .execute(&mut **tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::RecordNotFound(transaction.id));
                }
            }
            StoreWrite::DeleteTransaction { transaction_id } => {
                let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
                    .bind(transaction_id)
                    .execute(&mut **tx)
                    .await?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::RecordNotFound(*transaction_id));
                }
            }
            StoreWrite::AdjustBalance { account_id, delta } => {
                let result = sqlx::query(
                    r#"
                    UPDATE accounts
                    SET balance = balance + $2, updated_at = NOW()
                    WHERE id = $1
                    "#,
                )
                .bind(account_id)
                .bind(delta)
                .execute(&mut **tx)
                .await?;

                if result.rows_affected() == 0 {
                    return Err(StoreError::RecordNotFound(*account_id));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn get_account(
        &self,
        org_id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "{SELECT_ACCOUNT} WHERE id = $1 AND organization_id = $2"
        ))
        .bind(account_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::account_from_row).transpose()
    }

    async fn list_accounts(&self, org_id: Uuid) -> Result<Vec<Account>, StoreError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "{SELECT_ACCOUNT} WHERE organization_id = $1 ORDER BY created_at DESC"
        ))
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::account_from_row).collect()
    }

    async fn account_name_taken(
        &self,
        org_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, StoreError> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM accounts
                WHERE organization_id = $1 AND name = $2
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(org_id)
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    async fn get_transaction(
        &self,
        org_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<Transaction>, StoreError> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "{SELECT_TRANSACTION} WHERE id = $1 AND organization_id = $2"
        ))
        .bind(transaction_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::transaction_from_row).transpose()
    }

    async fn list_transactions(
        &self,
        org_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            r#"
            {SELECT_TRANSACTION}
            WHERE organization_id = $1
              AND ($2::uuid IS NULL OR from_account_id = $2 OR to_account_id = $2)
              AND ($3::text IS NULL OR type = $3)
              AND ($4::timestamptz IS NULL OR date >= $4)
              AND ($5::timestamptz IS NULL OR date <= $5)
              AND ($6::text IS NULL OR category ILIKE '%' || $6 || '%')
            ORDER BY date DESC
            "#
        ))
        .bind(org_id)
        .bind(filter.account_id)
        .bind(filter.tx_type.map(|t| t.as_str()))
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.category.as_deref())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::transaction_from_row).collect()
    }

    async fn transaction_reference_count(&self, account_id: Uuid) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM transactions
            WHERE from_account_id = $1 OR to_account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn commit(&self, unit: UnitOfWork) -> Result<(), StoreError> {
        if unit.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for write in unit.writes() {
            Self::apply_write(&mut tx, write).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
