//! Bank account HTTP handlers.
//!
//! This module implements the account-related API endpoints (staff only):
//! - POST /api/bankaccounts - Open a new account
//! - GET /api/bankaccounts/{id} - Get account by ID
//! - GET /api/bankaccounts - List all accounts

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::account::{AccountResponse, CreateAccountRequest},
    services::account_service,
};

/// Open a new bank account.
///
/// # Endpoint
///
/// `POST /api/bankaccounts`
///
/// # Request Body
///
/// ```json
/// {
///   "user_id": "660e8400-e29b-41d4-a716-446655440001",
///   "initial_balance": 30.21
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: Returns the created account
/// - **Error (400)**: Malformed body, or malformed or negative opening balance
/// - **Error (403)**: Caller is not staff
/// - **Error (404)**: Owner doesn't exist
pub async fn create_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    request: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_staff()?;
    let Json(request) = request?;

    let account = account_service::open_account(
        state.store.as_ref(),
        request.user_id,
        request.initial_balance.as_ref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

/// Get a specific account by ID.
pub async fn get_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    account_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AccountResponse>, AppError> {
    auth.require_staff()?;
    let Path(account_id) = account_id?;

    let account = account_service::get_account(state.store.as_ref(), account_id).await?;
    Ok(Json(account.into()))
}

/// List every account, oldest first.
///
/// # Response
///
/// ```json
/// [
///   {
///     "id": "550e8400-e29b-41d4-a716-446655440000",
///     "user_id": "660e8400-e29b-41d4-a716-446655440001",
///     "balance": "2.30",
///     "created_at": "2025-12-20T10:00:00Z",
///     "updated_at": "2025-12-20T10:00:00Z"
///   }
/// ]
/// ```
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    auth.require_staff()?;

    let accounts = account_service::list_accounts(state.store.as_ref()).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}
