//! Handlers module
//!
//! Services that orchestrate validation, record persistence and balance
//! mutation. Each operation is a request-scoped unit of work; nothing runs
//! in the background and nothing is retried.

mod account_handler;
mod commands;
mod transaction_handler;
mod validator;

#[cfg(test)]
mod tests;

pub use account_handler::AccountService;
pub use commands::{
    CreateAccountCommand, CreateTransactionCommand, UpdateAccountCommand,
    UpdateTransactionCommand,
};
pub use transaction_handler::TransactionService;
pub use validator::TransactionValidator;
