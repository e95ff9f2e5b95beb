//! Bearer token authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the token from the Authorization header
//! 2. Hash it and look up the user owning that hash
//! 3. Inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{app::AppState, error::AppError, models::user::hash_token};

/// Authentication context attached to authenticated requests.
///
/// This struct is inserted into the request's extension map and can be
/// extracted by route handlers to know who made the request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// ID of the authenticated user
    pub user_id: Uuid,

    pub username: String,

    /// Only staff may use the API
    pub is_staff: bool,

    /// Superusers may additionally create staff users
    pub is_superuser: bool,
}

impl AuthContext {
    /// Fail with `Forbidden` unless the caller is staff.
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

/// Token authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <token>` header from request
/// 2. Hash the `<token>` using SHA-256
/// 3. Look up the user with that token hash
/// 4. If found: inject `AuthContext` into request, call next handler
/// 5. If not found: return 401 Unauthorized error
///
/// # Headers
///
/// Expected header format:
/// ```text
/// Authorization: Bearer abc123xyz
/// ```
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::InvalidToken)?;

    // Expected format: "Bearer <token>"
    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::InvalidToken)?;

    let user = state
        .store
        .find_user_by_token_hash(&hash_token(token))
        .await?
        .ok_or(AppError::InvalidToken)?;

    let auth_context = AuthContext {
        user_id: user.id,
        username: user.username,
        is_staff: user.is_staff,
        is_superuser: user.is_superuser,
    };

    tracing::debug!(
        user_id = %auth_context.user_id,
        username = %auth_context.username,
        "request authenticated"
    );

    // Route handlers can now extract this using Extension<AuthContext>
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}
