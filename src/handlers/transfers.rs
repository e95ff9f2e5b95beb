//! Transfer and history HTTP handlers (staff only).
//!
//! This module implements:
//! - POST /api/bankaccounts/{id}/make_transfer - Move money to another account
//! - GET /api/bankaccounts/{id}/history - Balance history, oldest first

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use uuid::Uuid;

use crate::{
    app::AppState,
    error::AppError,
    middleware::auth::AuthContext,
    models::{
        history::HistoryEntry,
        transfer::{TransferOutcome, TransferRequest},
    },
    services::transfer_service,
};

/// Transfer money from the account in the path to `transferee`.
///
/// # Request Body
///
/// ```json
/// {
///   "transferee": "660e8400-e29b-41d4-a716-446655440001",
///   "amount": "12.50"
/// }
/// ```
///
/// # Response (200)
///
/// ```json
/// {
///   "from_balance": "37.75",
///   "to_balance": "15.00"
/// }
/// ```
///
/// # Errors
///
/// - **400**: Malformed body or ids; malformed, zero or negative amount
/// - **403**: Caller is not staff; same source and destination; not enough
///   money available; destination balance limit exceeded
/// - **404**: Either account doesn't exist
///
/// # Atomicity
///
/// Both accounts and both history entries are written in a single database
/// transaction. Either all of it is applied or none of it.
pub async fn make_transfer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    from_account_id: Result<Path<Uuid>, PathRejection>,
    request: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferOutcome>, AppError> {
    auth.require_staff()?;
    let Path(from_account_id) = from_account_id?;
    let Json(request) = request?;

    let outcome = transfer_service::transfer(
        state.store.as_ref(),
        from_account_id,
        request.transferee,
        &request.amount,
    )
    .await?;

    Ok(Json(outcome))
}

/// Balance history of an account, oldest entry first.
///
/// # Response (200)
///
/// ```json
/// [
///   {
///     "id": "770e8400-e29b-41d4-a716-446655440002",
///     "bank_account_id": "550e8400-e29b-41d4-a716-446655440000",
///     "performed_at": "2025-12-21T16:00:00Z",
///     "description": "Withdrawn 1.30 for arishabarron#660e8400-e29b-41d4-a716-446655440001"
///   }
/// ]
/// ```
pub async fn get_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    account_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    auth.require_staff()?;
    let Path(account_id) = account_id?;

    let entries = transfer_service::history(state.store.as_ref(), account_id).await?;
    Ok(Json(entries))
}
