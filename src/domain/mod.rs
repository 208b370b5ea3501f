//! Domain module
//!
//! Core domain types and business logic.

pub mod account;
pub mod amount;
pub mod effect;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountType};
pub use amount::{Amount, AmountError};
pub use effect::{apply_effects, revert_effects, BalanceChange};
pub use error::DomainError;
pub use transaction::{check_endpoints, Transaction, TransactionType};
