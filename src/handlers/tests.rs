//! Service-level tests against the in-memory store.

use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::domain::{AccountType, DomainError, TransactionType};
use crate::error::AppError;
use crate::handlers::{
    AccountService, CreateAccountCommand, CreateTransactionCommand, TransactionService,
    UpdateAccountCommand, UpdateTransactionCommand,
};
use crate::store::{LedgerStore, MemoryStore};

async fn account(store: &MemoryStore, org_id: Uuid, name: &str) -> Uuid {
    AccountService::new(store.clone())
        .create(org_id, CreateAccountCommand::new(name, AccountType::Asset))
        .await
        .unwrap()
        .id
}

async fn balance_of(store: &MemoryStore, org_id: Uuid, account_id: Uuid) -> rust_decimal::Decimal {
    store
        .get_account(org_id, account_id)
        .await
        .unwrap()
        .unwrap()
        .balance
}

#[tokio::test]
async fn test_validator_runs_not_found_before_inactive() {
    let store = MemoryStore::new();
    let org_id = Uuid::new_v4();

    let accounts = AccountService::new(store.clone());
    let inactive = accounts
        .create(org_id, {
            let mut cmd = CreateAccountCommand::new("Dormant", AccountType::Asset);
            cmd.is_active = Some(false);
            cmd
        })
        .await
        .unwrap();

    // Transfer from a missing account to an inactive one: resolution of the
    // missing endpoint must win.
    let missing = Uuid::new_v4();
    let cmd = CreateTransactionCommand::new(TransactionType::Transfer, "10.00")
        .from_account(missing)
        .to_account(inactive.id);
    let err = TransactionService::new(store.clone())
        .create(org_id, cmd)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AccountNotFound(id) if id == missing));
}

#[tokio::test]
async fn test_inactive_endpoint_rejected_naming_account() {
    let store = MemoryStore::new();
    let org_id = Uuid::new_v4();

    let inactive = AccountService::new(store.clone())
        .create(org_id, {
            let mut cmd = CreateAccountCommand::new("Old Savings", AccountType::Asset);
            cmd.is_active = Some(false);
            cmd
        })
        .await
        .unwrap();

    let cmd = CreateTransactionCommand::new(TransactionType::Income, "10.00")
        .to_account(inactive.id);
    let err = TransactionService::new(store.clone())
        .create(org_id, cmd)
        .await
        .unwrap_err();

    match err {
        AppError::Validation(DomainError::AccountInactive { name }) => {
            assert_eq!(name, "Old Savings");
        }
        other => panic!("Expected AccountInactive, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_non_positive_amount_rejected_before_shape() {
    let store = MemoryStore::new();
    let org_id = Uuid::new_v4();

    // Both the amount and the shape are wrong; the amount rule fires first.
    let cmd = CreateTransactionCommand::new(TransactionType::Income, "-5.00");
    let err = TransactionService::new(store.clone())
        .create(org_id, cmd)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Amount(_)));
}

#[tokio::test]
async fn test_tenant_isolation_in_validation() {
    let store = MemoryStore::new();
    let org_a = Uuid::new_v4();
    let org_b = Uuid::new_v4();
    let foreign = account(&store, org_b, "Foreign Cash").await;

    // An account of another organization behaves like a missing one.
    let cmd = CreateTransactionCommand::new(TransactionType::Income, "10.00").to_account(foreign);
    let err = TransactionService::new(store.clone())
        .create(org_a, cmd)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AccountNotFound(id) if id == foreign));
}

#[tokio::test]
async fn test_update_without_effect_change_keeps_balances() {
    let store = MemoryStore::new();
    let org_id = Uuid::new_v4();
    let cash = account(&store, org_id, "Cash").await;

    let transactions = TransactionService::new(store.clone());
    let tx = transactions
        .create(
            org_id,
            CreateTransactionCommand::new(TransactionType::Income, "100.00").to_account(cash),
        )
        .await
        .unwrap();

    let mut cmd = UpdateTransactionCommand::default();
    cmd.description = Some("May payroll".to_string());
    cmd.category = Some("Salary".to_string());
    let updated = transactions.update(org_id, tx.id, cmd).await.unwrap();

    assert_eq!(updated.description.as_deref(), Some("May payroll"));
    assert_eq!(balance_of(&store, org_id, cash).await, dec!(100.00));
}

#[tokio::test]
async fn test_type_change_takes_endpoints_from_command() {
    let store = MemoryStore::new();
    let org_id = Uuid::new_v4();
    let cash = account(&store, org_id, "Cash").await;

    let transactions = TransactionService::new(store.clone());
    let tx = transactions
        .create(
            org_id,
            CreateTransactionCommand::new(TransactionType::Income, "100.00").to_account(cash),
        )
        .await
        .unwrap();

    // INCOME -> EXPENSE without supplying from_account_id: the old
    // to_account_id must not leak into the new shape, so this fails the
    // "source required" rule rather than "destination forbidden".
    let mut cmd = UpdateTransactionCommand::default();
    cmd.tx_type = Some(TransactionType::Expense);
    let err = transactions.update(org_id, tx.id, cmd).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(DomainError::ExpenseMissingSource)
    ));

    // Supplying the source completes the change: +100 reverted, -100 applied.
    let mut cmd = UpdateTransactionCommand::default();
    cmd.tx_type = Some(TransactionType::Expense);
    cmd.from_account_id = Some(cash);
    let updated = transactions.update(org_id, tx.id, cmd).await.unwrap();

    assert_eq!(updated.tx_type, TransactionType::Expense);
    assert_eq!(updated.from_account_id, Some(cash));
    assert_eq!(updated.to_account_id, None);
    assert_eq!(balance_of(&store, org_id, cash).await, dec!(-100.00));
}

#[tokio::test]
async fn test_duplicate_account_name_conflict() {
    let store = MemoryStore::new();
    let org_id = Uuid::new_v4();
    let accounts = AccountService::new(store.clone());

    account(&store, org_id, "Cash").await;
    let err = accounts
        .create(org_id, CreateAccountCommand::new("Cash", AccountType::Asset))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateAccountName(name) if name == "Cash"));

    // Same name in another organization is fine.
    let other_org = Uuid::new_v4();
    assert!(accounts
        .create(other_org, CreateAccountCommand::new("Cash", AccountType::Asset))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_rename_to_taken_name_conflict() {
    let store = MemoryStore::new();
    let org_id = Uuid::new_v4();
    let accounts = AccountService::new(store.clone());

    account(&store, org_id, "Cash").await;
    let savings = account(&store, org_id, "Savings").await;

    let mut cmd = UpdateAccountCommand::default();
    cmd.name = Some("Cash".to_string());
    let err = accounts.update(org_id, savings, cmd).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateAccountName(_)));

    // Renaming to its own current name is not a conflict.
    let mut cmd = UpdateAccountCommand::default();
    cmd.name = Some("Savings".to_string());
    assert!(accounts.update(org_id, savings, cmd).await.is_ok());
}

#[tokio::test]
async fn test_account_update_does_not_touch_balance() {
    let store = MemoryStore::new();
    let org_id = Uuid::new_v4();
    let cash = account(&store, org_id, "Cash").await;

    TransactionService::new(store.clone())
        .create(
            org_id,
            CreateTransactionCommand::new(TransactionType::Income, "75.00").to_account(cash),
        )
        .await
        .unwrap();

    let mut cmd = UpdateAccountCommand::default();
    cmd.description = Some("Main operating account".to_string());
    let updated = AccountService::new(store.clone())
        .update(org_id, cash, cmd)
        .await
        .unwrap();

    assert_eq!(updated.balance, dec!(75.00));
    assert_eq!(balance_of(&store, org_id, cash).await, dec!(75.00));
}

#[tokio::test]
async fn test_delete_missing_transaction_is_not_found() {
    let store = MemoryStore::new();
    let org_id = Uuid::new_v4();

    let err = TransactionService::new(store.clone())
        .delete(org_id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TransactionNotFound(_)));
}
