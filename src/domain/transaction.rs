//! Transaction record
//!
//! A typed, amount-bearing event that mutates one or two account balances.
//! Which endpoints must be populated is fully determined by the type, and
//! `check_endpoints` is the single authority on that shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Amount, DomainError};

/// Transaction type. Closed set; the balance effect of a transaction is
/// derived exhaustively from this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
            TransactionType::Transfer => "TRANSFER",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(TransactionType::Income),
            "EXPENSE" => Ok(TransactionType::Expense),
            "TRANSFER" => Ok(TransactionType::Transfer),
            other => Err(format!(
                "Invalid transaction type '{}'. Must be one of: INCOME, EXPENSE, TRANSFER",
                other
            )),
        }
    }
}

/// A transaction within an organization.
///
/// `from_account_id`/`to_account_id` are weak references into Account; when
/// present they must resolve to an active account in the same organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub tx_type: TransactionType,
    pub amount: Amount,
    pub currency: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    /// Occurrence date; defaults to creation time.
    pub date: DateTime<Utc>,
    pub from_account_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Check that the populated endpoints match the transaction type.
///
/// Pure with respect to the store; resolution and active checks live in the
/// validator. First violated rule wins.
pub fn check_endpoints(
    tx_type: TransactionType,
    from_account_id: Option<Uuid>,
    to_account_id: Option<Uuid>,
) -> Result<(), DomainError> {
    match tx_type {
        TransactionType::Income => {
            if to_account_id.is_none() {
                return Err(DomainError::IncomeMissingDestination);
            }
            if from_account_id.is_some() {
                return Err(DomainError::IncomeHasSource);
            }
        }
        TransactionType::Expense => {
            if from_account_id.is_none() {
                return Err(DomainError::ExpenseMissingSource);
            }
            if to_account_id.is_some() {
                return Err(DomainError::ExpenseHasDestination);
            }
        }
        TransactionType::Transfer => {
            if from_account_id.is_none() || to_account_id.is_none() {
                return Err(DomainError::TransferMissingEndpoints);
            }
            if from_account_id == to_account_id {
                return Err(DomainError::SameAccountTransfer);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn test_income_requires_destination() {
        let result = check_endpoints(TransactionType::Income, None, None);
        assert_eq!(result, Err(DomainError::IncomeMissingDestination));
    }

    #[test]
    fn test_income_rejects_source() {
        let result = check_endpoints(TransactionType::Income, Some(id()), Some(id()));
        assert_eq!(result, Err(DomainError::IncomeHasSource));
    }

    #[test]
    fn test_income_valid_shape() {
        assert!(check_endpoints(TransactionType::Income, None, Some(id())).is_ok());
    }

    #[test]
    fn test_expense_requires_source() {
        let result = check_endpoints(TransactionType::Expense, None, Some(id()));
        assert_eq!(result, Err(DomainError::ExpenseMissingSource));
    }

    #[test]
    fn test_expense_rejects_destination() {
        let result = check_endpoints(TransactionType::Expense, Some(id()), Some(id()));
        assert_eq!(result, Err(DomainError::ExpenseHasDestination));
    }

    #[test]
    fn test_transfer_requires_both_endpoints() {
        assert_eq!(
            check_endpoints(TransactionType::Transfer, Some(id()), None),
            Err(DomainError::TransferMissingEndpoints)
        );
        assert_eq!(
            check_endpoints(TransactionType::Transfer, None, Some(id())),
            Err(DomainError::TransferMissingEndpoints)
        );
    }

    #[test]
    fn test_transfer_rejects_same_account() {
        let account = id();
        let result = check_endpoints(TransactionType::Transfer, Some(account), Some(account));
        assert_eq!(result, Err(DomainError::SameAccountTransfer));
    }

    #[test]
    fn test_rejection_is_idempotent() {
        // Validating the same malformed shape twice yields the same reason.
        let from = id();
        let to = id();
        let first = check_endpoints(TransactionType::Expense, Some(from), Some(to));
        let second = check_endpoints(TransactionType::Expense, Some(from), Some(to));
        assert_eq!(first, second);
    }

    #[test]
    fn test_transaction_type_round_trip() {
        for t in [
            TransactionType::Income,
            TransactionType::Expense,
            TransactionType::Transfer,
        ] {
            assert_eq!(t.as_str().parse::<TransactionType>().unwrap(), t);
        }
        assert!("REFUND".parse::<TransactionType>().is_err());
    }
}
