//! Error types and HTTP error response handling.
//!
//! This module defines the errors returned by the balance service and how
//! they are converted into HTTP responses with appropriate status codes and
//! JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::store::StoreError;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Validation Errors**: bad amounts or ids, never retried
/// - **Resource Errors**: requested user does not exist
/// - **Business Logic Errors**: operations that would overdraw a balance
/// - **Store Errors**: connection or write failures, potentially transient
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested user does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("User {0} not found")]
    UserNotFound(i64),

    /// Sender's balance does not cover the operation.
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("Insufficient balance")]
    InsufficientBalance,

    /// The ledger store failed.
    ///
    /// Returns HTTP 500 Internal Server Error without the underlying detail.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidUserId(id) => {
                AppError::InvalidRequest(format!("invalid user id: {id}"))
            }
            StoreError::UserNotFound(id) => AppError::UserNotFound(id),
            StoreError::InsufficientFunds(_) => AppError::InsufficientBalance,
            StoreError::BalanceOverflow(id) => AppError::InvalidRequest(format!(
                "balance of user {id} would exceed the maximum"
            )),
            other => AppError::Store(other),
        }
    }
}

impl AppError {
    /// Stable machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::UserNotFound(_) => "user_not_found",
            AppError::InsufficientBalance => "insufficient_balance",
            AppError::Store(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidRequest` → 400 Bad Request
/// - `UserNotFound` → 404 Not Found
/// - `InsufficientBalance` → 422 Unprocessable Entity
/// - `Store` → 500 Internal Server Error (details are logged, not returned)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::InvalidRequest(msg) => msg.clone(),
            AppError::Store(err) => {
                tracing::error!(error = %err, "ledger store failure");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (self.status(), body).into_response()
    }
}
