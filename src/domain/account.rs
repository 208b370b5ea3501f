//! Account record
//!
//! A named balance-holding entity owned by exactly one organization.
//! The stored balance is only ever mutated through transaction effects
//! (see `effect.rs`); nothing else in the system writes it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Accounting category of an account. Closed set; the engine only tags
/// accounts with it and never restricts behavior by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "ASSET",
            AccountType::Liability => "LIABILITY",
            AccountType::Equity => "EQUITY",
            AccountType::Revenue => "REVENUE",
            AccountType::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASSET" => Ok(AccountType::Asset),
            "LIABILITY" => Ok(AccountType::Liability),
            "EQUITY" => Ok(AccountType::Equity),
            "REVENUE" => Ok(AccountType::Revenue),
            "EXPENSE" => Ok(AccountType::Expense),
            other => Err(format!(
                "Invalid account type '{}'. Must be one of: ASSET, LIABILITY, EQUITY, REVENUE, EXPENSE",
                other
            )),
        }
    }
}

/// An account within an organization.
///
/// Invariant: `balance` equals the signed sum of the effects of all live
/// transactions referencing this account. The balance is an exact decimal
/// and serializes as a decimal string, never a binary float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Unique within the organization.
    pub name: String,
    pub account_type: AccountType,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    pub currency: String,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a zero balance.
    pub fn new(
        organization_id: Uuid,
        name: String,
        account_type: AccountType,
        currency: Option<String>,
        description: Option<String>,
        is_active: Option<bool>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            name,
            account_type,
            balance: Decimal::ZERO,
            currency: currency.unwrap_or_else(|| "USD".to_string()),
            is_active: is_active.unwrap_or(true),
            description,
            created_at: now,
            updated_at: now,
        }
    }
}
