//! API Middleware
//!
//! Organization access control and request logging. Identity issuance is
//! out of scope: the authenticated caller id arrives in `X-User-Id` from
//! the upstream auth collaborator, and this layer only answers "may this
//! caller act within organization X, and in what role".

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::store::{PgStore, Role};

/// Per-request organization context, attached by `org_access_middleware`.
#[derive(Debug, Clone, Copy)]
pub struct OrgContext {
    pub org_id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
}

impl OrgContext {
    /// Viewers may read but not mutate.
    pub fn require_write(&self) -> Result<(), crate::error::AppError> {
        if self.role.can_write() {
            Ok(())
        } else {
            Err(crate::error::AppError::Forbidden(
                "write access requires the member or admin role".to_string(),
            ))
        }
    }
}

fn reject(status: StatusCode, error: &str, error_code: &str) -> Response {
    (
        status,
        Json(json!({ "error": error, "error_code": error_code })),
    )
        .into_response()
}

fn header_uuid(headers: &HeaderMap, name: &str) -> Result<Option<Uuid>, ()> {
    match headers.get(name).and_then(|v| v.to_str().ok()) {
        Some(raw) => Uuid::parse_str(raw).map(Some).map_err(|_| ()),
        None => Ok(None),
    }
}

/// Resolve the caller's membership in the target organization and attach
/// an [`OrgContext`] to the request.
pub async fn org_access_middleware(
    State(store): State<PgStore>,
    headers: HeaderMap,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let org_id = match header_uuid(&headers, "X-Org-Id") {
        Ok(Some(org_id)) => org_id,
        Ok(None) => {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                "X-Org-Id header is required",
                "missing_org_id",
            ));
        }
        Err(()) => {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                "Invalid X-Org-Id header format",
                "invalid_org_id",
            ));
        }
    };

    let user_id = match header_uuid(&headers, "X-User-Id") {
        Ok(Some(user_id)) => user_id,
        Ok(None) => {
            return Err(reject(
                StatusCode::FORBIDDEN,
                "User not authenticated",
                "not_authenticated",
            ));
        }
        Err(()) => {
            return Err(reject(
                StatusCode::BAD_REQUEST,
                "Invalid X-User-Id header format",
                "invalid_user_id",
            ));
        }
    };

    let role = match store.membership_role(org_id, user_id).await {
        Ok(Some(role)) => role,
        Ok(None) => {
            return Err(reject(
                StatusCode::FORBIDDEN,
                "You do not have access to this organization",
                "org_access_denied",
            ));
        }
        Err(e) => {
            tracing::error!("Membership lookup failed: {:?}", e);
            return Err(reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                "store_error",
            ));
        }
    };

    request.extensions_mut().insert(OrgContext {
        org_id,
        user_id,
        role,
    });

    Ok(next.run(request).await)
}

/// Log method, path, status and latency for every request.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "request"
    );

    response
}
