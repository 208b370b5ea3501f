//! Error handling module
//!
//! Centralized error types and HTTP response conversion. The taxonomy is
//! NotFound / InvalidInput / PreconditionFailed / Conflict; every variant
//! is terminal and surfaced verbatim to the caller, nothing is retried
//! internally.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{AmountError, DomainError};
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // 404 - absent or outside the caller's organization; the two cases are
    // deliberately indistinguishable so tenancy is not leaked.
    #[error("Account with ID '{0}' not found in your organization")]
    AccountNotFound(Uuid),

    #[error("Transaction with ID '{0}' not found in your organization")]
    TransactionNotFound(Uuid),

    // 400
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    // 403
    #[error("You do not have access to this organization")]
    OrgAccessDenied,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // 409
    #[error("An account named '{0}' already exists in this organization")]
    DuplicateAccountName(String),

    // 412
    #[error("Account '{account_id}' is referenced by {references} transaction(s) and cannot be deleted")]
    AccountInUse { account_id: Uuid, references: i64 },

    // 5xx
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 404 Not Found
            AppError::AccountNotFound(id) => {
                (StatusCode::NOT_FOUND, "account_not_found", Some(id.to_string()))
            }
            AppError::TransactionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "transaction_not_found",
                Some(id.to_string()),
            ),

            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::Amount(e) => {
                (StatusCode::BAD_REQUEST, "invalid_amount", Some(e.to_string()))
            }
            AppError::Validation(domain_err) => {
                if domain_err.is_precondition() {
                    (
                        StatusCode::PRECONDITION_FAILED,
                        "account_inactive",
                        Some(domain_err.to_string()),
                    )
                } else {
                    (
                        StatusCode::BAD_REQUEST,
                        "invalid_transaction_shape",
                        Some(domain_err.to_string()),
                    )
                }
            }
            AppError::MissingHeader(header) => (
                StatusCode::BAD_REQUEST,
                "missing_header",
                Some(header.to_string()),
            ),

            // 403 Forbidden
            AppError::OrgAccessDenied => (StatusCode::FORBIDDEN, "org_access_denied", None),
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone()))
            }

            // 409 Conflict
            AppError::DuplicateAccountName(name) => {
                (StatusCode::CONFLICT, "duplicate_account_name", Some(name.clone()))
            }

            // 412 Precondition Failed
            AppError::AccountInUse { references, .. } => (
                StatusCode::PRECONDITION_FAILED,
                "account_in_use",
                Some(format!("{} transaction(s) reference this account", references)),
            ),

            // 500 Internal Server Error
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_does_not_leak_tenancy() {
        // Absent and wrong-organization produce the same error; there is no
        // separate variant to distinguish them.
        let err = AppError::AccountNotFound(Uuid::new_v4());
        assert!(err.to_string().contains("not found in your organization"));
    }

    #[test]
    fn test_shape_violation_maps_to_invalid_input() {
        let response =
            AppError::Validation(DomainError::ExpenseHasDestination).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_inactive_account_maps_to_precondition_failed() {
        let response = AppError::Validation(DomainError::AccountInactive {
            name: "Cash".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    }

    #[test]
    fn test_duplicate_name_maps_to_conflict() {
        let response = AppError::DuplicateAccountName("Cash".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
