//! Common test utilities

use rust_decimal::Decimal;
use uuid::Uuid;

use org_ledger::domain::{Account, AccountType, Transaction, TransactionType};
use org_ledger::handlers::{
    AccountService, CreateAccountCommand, CreateTransactionCommand, TransactionService,
};
use org_ledger::store::{LedgerStore, MemoryStore};

/// One organization with its services over a shared in-memory store.
pub struct TestLedger {
    pub store: MemoryStore,
    pub org_id: Uuid,
}

impl TestLedger {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            org_id: Uuid::new_v4(),
        }
    }

    pub fn accounts(&self) -> AccountService<MemoryStore> {
        AccountService::new(self.store.clone())
    }

    pub fn transactions(&self) -> TransactionService<MemoryStore> {
        TransactionService::new(self.store.clone())
    }

    /// Create an active asset account and return its id.
    pub async fn account(&self, name: &str) -> Uuid {
        self.accounts()
            .create(
                self.org_id,
                CreateAccountCommand::new(name, AccountType::Asset),
            )
            .await
            .expect("account creation failed")
            .id
    }

    pub async fn get_account(&self, account_id: Uuid) -> Account {
        self.store
            .get_account(self.org_id, account_id)
            .await
            .unwrap()
            .expect("account missing")
    }

    pub async fn balance(&self, account_id: Uuid) -> Decimal {
        self.get_account(account_id).await.balance
    }

    pub async fn income(&self, to: Uuid, amount: &str) -> Transaction {
        self.transactions()
            .create(
                self.org_id,
                CreateTransactionCommand::new(TransactionType::Income, amount).to_account(to),
            )
            .await
            .expect("income creation failed")
    }

    pub async fn expense(&self, from: Uuid, amount: &str) -> Transaction {
        self.transactions()
            .create(
                self.org_id,
                CreateTransactionCommand::new(TransactionType::Expense, amount).from_account(from),
            )
            .await
            .expect("expense creation failed")
    }

    pub async fn transfer(&self, from: Uuid, to: Uuid, amount: &str) -> Transaction {
        self.transactions()
            .create(
                self.org_id,
                CreateTransactionCommand::new(TransactionType::Transfer, amount)
                    .from_account(from)
                    .to_account(to),
            )
            .await
            .expect("transfer creation failed")
    }

    /// Recompute an account's balance from the live transactions that
    /// reference it; the stored balance must always agree with this.
    pub async fn net_effect(&self, account_id: Uuid) -> Decimal {
        let filter = org_ledger::TransactionFilter {
            account_id: Some(account_id),
            ..Default::default()
        };
        let transactions = self
            .store
            .list_transactions(self.org_id, &filter)
            .await
            .unwrap();

        let mut total = Decimal::ZERO;
        for tx in transactions {
            for change in org_ledger::domain::apply_effects(&tx) {
                if change.account_id == account_id {
                    total += change.delta;
                }
            }
        }
        total
    }
}
