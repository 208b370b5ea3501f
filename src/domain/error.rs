//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure. The endpoint
//! shape messages are surfaced verbatim to callers, so they name the field
//! that violated the rule.

use thiserror::Error;

/// Business rule violations raised by transaction validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// INCOME without a destination account
    #[error("Income transactions require a destination account (to_account_id). Please select which account will receive this income.")]
    IncomeMissingDestination,

    /// INCOME with a source account set
    #[error("Income transactions should not have a source account (from_account_id). Use TRANSFER for account-to-account movements.")]
    IncomeHasSource,

    /// EXPENSE without a source account
    #[error("Expense transactions require a source account (from_account_id). Please select which account will be charged.")]
    ExpenseMissingSource,

    /// EXPENSE with a destination account set
    #[error("Expense transactions should not have a destination account (to_account_id). Use TRANSFER for account-to-account movements.")]
    ExpenseHasDestination,

    /// TRANSFER missing one or both endpoints
    #[error("Transfer transactions require both source (from_account_id) and destination (to_account_id) accounts.")]
    TransferMissingEndpoints,

    /// TRANSFER where both endpoints are the same account
    #[error("Cannot transfer funds to the same account. Source and destination must be different.")]
    SameAccountTransfer,

    /// Referenced account exists but is not active
    #[error("Account '{name}' is inactive. Please activate the account before creating transactions.")]
    AccountInactive { name: String },
}

impl DomainError {
    /// Precondition failures are distinct from plain invalid input: the
    /// request shape was fine, but the referenced state forbids it.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::AccountInactive { .. })
    }
}
