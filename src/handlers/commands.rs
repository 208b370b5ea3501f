//! Command types
//!
//! Plain inputs for the account and transaction services. Amounts arrive as
//! strings and are parsed into `Amount` inside the handlers, so the exact
//! decimal text survives until validation.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AccountType, TransactionType};

#[derive(Debug, Clone)]
pub struct CreateAccountCommand {
    pub name: String,
    pub account_type: AccountType,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl CreateAccountCommand {
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            name: name.into(),
            account_type,
            currency: None,
            description: None,
            is_active: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAccountCommand {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct CreateTransactionCommand {
    pub tx_type: TransactionType,
    pub amount: String,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub date: Option<DateTime<Utc>>,
    pub from_account_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
}

impl CreateTransactionCommand {
    pub fn new(tx_type: TransactionType, amount: impl Into<String>) -> Self {
        Self {
            tx_type,
            amount: amount.into(),
            currency: None,
            description: None,
            category: None,
            tags: None,
            date: None,
            from_account_id: None,
            to_account_id: None,
        }
    }

    pub fn from_account(mut self, account_id: Uuid) -> Self {
        self.from_account_id = Some(account_id);
        self
    }

    pub fn to_account(mut self, account_id: Uuid) -> Self {
        self.to_account_id = Some(account_id);
        self
    }
}

/// Partial update; `None` leaves a field unchanged. When `tx_type` changes,
/// the endpoint fields are taken exclusively from the command (the new
/// type's shape determines which must be present), otherwise omitted
/// endpoints keep their old values.
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionCommand {
    pub tx_type: Option<TransactionType>,
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub date: Option<DateTime<Utc>>,
    pub from_account_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
}

impl UpdateTransactionCommand {
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }
}
