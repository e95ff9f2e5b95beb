//! User management HTTP handlers.
//!
//! This module implements the user-related API endpoints (staff only):
//! - POST /api/users - Create a user and issue its token
//! - GET /api/users - List users
//! - GET /api/users/{id} - Get a user

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
    models::user::{CreateUserRequest, UserResponse},
    services::user_service,
};

/// Create a new user.
///
/// # Request Body
///
/// ```json
/// {
///   "username": "georginahazel",
///   "is_staff": false
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: The user, including its bearer token
/// - **Error (400)**: Malformed body or invalid username
/// - **Error (403)**: Caller is not staff
/// - **Error (409)**: Username taken
///
/// # Permissions
///
/// Staff may create users. The `is_staff` flag is only honored when the caller
/// is a superuser; for other staff it is silently dropped.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    request: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_staff()?;
    let Json(request) = request?;

    let is_staff = request.is_staff && auth.is_superuser;
    let (user, token) =
        user_service::create_user(state.store.as_ref(), &request.username, is_staff).await?;

    let response = UserResponse::from(user).with_token(token);
    Ok((StatusCode::CREATED, Json(response)))
}

/// List every user, oldest first. Tokens are never included.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    auth.require_staff()?;

    let users = user_service::list_users(state.store.as_ref()).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Get a specific user by ID.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    user_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<UserResponse>, AppError> {
    auth.require_staff()?;
    let Path(user_id) = user_id?;

    let user = user_service::get_user(state.store.as_ref(), user_id).await?;
    Ok(Json(user.into()))
}
