//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Services return these variants directly so the HTTP boundary can pick a
/// status code per failure kind instead of inspecting messages.
///
/// # Error Categories
///
/// - **Persistence Errors**: Any sqlx::Error raised inside a unit of work
/// - **Authentication Errors**: Missing or unknown bearer token, missing permission
/// - **Resource Errors**: Requested user or account not found
/// - **Business Rule Errors**: Self transfers, overdrafts and the balance limit
/// - **Validation Errors**: Malformed amounts and request fields
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Storage operation failed (connection error, query error, failed commit).
    ///
    /// Whatever unit of work was open is rolled back. Returns HTTP 500 with
    /// the details hidden from the client.
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Bearer token is missing or does not belong to any user.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid token")]
    InvalidToken,

    /// The authenticated user is not allowed to perform this operation.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// Requested account does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Account not found")]
    AccountNotFound,

    /// Requested user does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("User not found")]
    UserNotFound,

    /// Source and destination of a transfer are the same account.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Cannot transfer to the same account")]
    SelfTransfer,

    /// Source account balance is lower than the requested amount.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Not enough money available")]
    InsufficientFunds,

    /// Destination balance would exceed the largest storable balance.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Destination balance would exceed the account limit")]
    BalanceLimitExceeded,

    /// Amount is malformed, not positive, or has more than two fractional digits.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Username is already registered.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Username is already taken")]
    UsernameTaken,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "permission_denied"),
            AppError::AccountNotFound => (StatusCode::NOT_FOUND, "account_not_found"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found"),
            AppError::SelfTransfer => (StatusCode::FORBIDDEN, "self_transfer"),
            AppError::InsufficientFunds => (StatusCode::FORBIDDEN, "insufficient_funds"),
            AppError::BalanceLimitExceeded => (StatusCode::FORBIDDEN, "balance_limit_exceeded"),
            AppError::InvalidAmount(_) => (StatusCode::BAD_REQUEST, "invalid_amount"),
            AppError::UsernameTaken => (StatusCode::CONFLICT, "username_taken"),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
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
/// - `InvalidToken` → 401 Unauthorized
/// - `Forbidden`, `SelfTransfer`, `InsufficientFunds`, `BalanceLimitExceeded` → 403 Forbidden
/// - `AccountNotFound`, `UserNotFound` → 404 Not Found
/// - `UsernameTaken` → 409 Conflict
/// - `InvalidAmount`, `InvalidRequest` → 400 Bad Request
/// - `Persistence` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            AppError::InvalidRequest(msg) => msg,
            AppError::Persistence(ref err) => {
                tracing::error!(error = %err, "persistence failure");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

// Extractor rejections share the JSON error body of every other failure
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}
