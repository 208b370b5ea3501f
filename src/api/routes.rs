//! API Routes
//!
//! HTTP endpoint definitions. All routes are organization-scoped via the
//! org-access middleware; amounts and balances cross this boundary as exact
//! decimal strings, never binary floats.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Account, AccountType, Transaction, TransactionType};
use crate::error::AppError;
use crate::handlers::{
    AccountService, CreateAccountCommand, CreateTransactionCommand, TransactionService,
    UpdateAccountCommand, UpdateTransactionCommand,
};
use crate::store::{PgStore, TransactionFilter};

use super::middleware::OrgContext;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// Exact decimal string, e.g. "100.00".
    pub amount: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub from_account_id: Option<Uuid>,
    #[serde(default)]
    pub to_account_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(rename = "type", default)]
    pub tx_type: Option<TransactionType>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub from_account_id: Option<Uuid>,
    #[serde(default)]
    pub to_account_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    #[serde(default)]
    pub account_id: Option<Uuid>,
    #[serde(rename = "type", default)]
    pub tx_type: Option<TransactionType>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<String>,
}

impl From<TransactionListQuery> for TransactionFilter {
    fn from(query: TransactionListQuery) -> Self {
        TransactionFilter {
            account_id: query.account_id,
            tx_type: query.tx_type,
            start_date: query.start_date,
            end_date: query.end_date,
            category: query.category,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgStore> {
    Router::new()
        // Accounts
        .route("/accounts", post(create_account))
        .route("/accounts", get(list_accounts))
        .route("/accounts/:account_id", get(get_account))
        .route("/accounts/:account_id", patch(update_account))
        .route("/accounts/:account_id", delete(delete_account))
        // Transactions
        .route("/transactions", post(create_transaction))
        .route("/transactions", get(list_transactions))
        .route("/transactions/:transaction_id", get(get_transaction))
        .route("/transactions/:transaction_id", patch(update_transaction))
        .route("/transactions/:transaction_id", delete(delete_transaction))
}

// =========================================================================
// Account endpoints
// =========================================================================

async fn create_account(
    State(store): State<PgStore>,
    Extension(ctx): Extension<OrgContext>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    ctx.require_write()?;

    let command = CreateAccountCommand {
        name: request.name,
        account_type: request.account_type,
        currency: request.currency,
        description: request.description,
        is_active: request.is_active,
    };

    let account = AccountService::new(store).create(ctx.org_id, command).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn list_accounts(
    State(store): State<PgStore>,
    Extension(ctx): Extension<OrgContext>,
) -> Result<Json<Vec<Account>>, AppError> {
    let accounts = AccountService::new(store).list(ctx.org_id).await?;
    Ok(Json(accounts))
}

async fn get_account(
    State(store): State<PgStore>,
    Extension(ctx): Extension<OrgContext>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<Account>, AppError> {
    let account = AccountService::new(store).get(ctx.org_id, account_id).await?;
    Ok(Json(account))
}

async fn update_account(
    State(store): State<PgStore>,
    Extension(ctx): Extension<OrgContext>,
    Path(account_id): Path<Uuid>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<Account>, AppError> {
    ctx.require_write()?;

    let command = UpdateAccountCommand {
        name: request.name,
        account_type: request.account_type,
        currency: request.currency,
        description: request.description,
        is_active: request.is_active,
    };

    let account = AccountService::new(store)
        .update(ctx.org_id, account_id, command)
        .await?;
    Ok(Json(account))
}

async fn delete_account(
    State(store): State<PgStore>,
    Extension(ctx): Extension<OrgContext>,
    Path(account_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ctx.require_write()?;

    AccountService::new(store).delete(ctx.org_id, account_id).await?;
    Ok(Json(MessageResponse {
        message: "Account deleted successfully",
    }))
}

// =========================================================================
// Transaction endpoints
// =========================================================================

async fn create_transaction(
    State(store): State<PgStore>,
    Extension(ctx): Extension<OrgContext>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    ctx.require_write()?;

    let command = CreateTransactionCommand {
        tx_type: request.tx_type,
        amount: request.amount,
        currency: request.currency,
        description: request.description,
        category: request.category,
        tags: request.tags,
        date: request.date,
        from_account_id: request.from_account_id,
        to_account_id: request.to_account_id,
    };

    let transaction = TransactionService::new(store)
        .create(ctx.org_id, command)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn list_transactions(
    State(store): State<PgStore>,
    Extension(ctx): Extension<OrgContext>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let filter: TransactionFilter = query.into();
    let transactions = TransactionService::new(store)
        .list(ctx.org_id, &filter)
        .await?;
    Ok(Json(transactions))
}

async fn get_transaction(
    State(store): State<PgStore>,
    Extension(ctx): Extension<OrgContext>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<Transaction>, AppError> {
    let transaction = TransactionService::new(store)
        .get(ctx.org_id, transaction_id)
        .await?;
    Ok(Json(transaction))
}

async fn update_transaction(
    State(store): State<PgStore>,
    Extension(ctx): Extension<OrgContext>,
    Path(transaction_id): Path<Uuid>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<Transaction>, AppError> {
    ctx.require_write()?;

    let command = UpdateTransactionCommand {
        tx_type: request.tx_type,
        amount: request.amount,
        currency: request.currency,
        description: request.description,
        category: request.category,
        tags: request.tags,
        date: request.date,
        from_account_id: request.from_account_id,
        to_account_id: request.to_account_id,
    };

    let transaction = TransactionService::new(store)
        .update(ctx.org_id, transaction_id, command)
        .await?;
    Ok(Json(transaction))
}

async fn delete_transaction(
    State(store): State<PgStore>,
    Extension(ctx): Extension<OrgContext>,
    Path(transaction_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ctx.require_write()?;

    TransactionService::new(store)
        .delete(ctx.org_id, transaction_id)
        .await?;
    Ok(Json(MessageResponse {
        message: "Transaction deleted successfully",
    }))
}
