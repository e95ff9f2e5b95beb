//! User model for authentication and account ownership.
//!
//! Users authenticate with a bearer token. Only the SHA-256 hash of the token
//! is stored; the plaintext is shown once, when the user is created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Represents a user record from the database.
///
/// # Database Table
///
/// Maps to the `users` table with columns:
/// - `id`: Unique identifier (UUID)
/// - `username`: Unique login name
/// - `token_hash`: SHA-256 hash of the user's bearer token
/// - `is_staff`: Staff users manage users and accounts for everyone
/// - `is_superuser`: Superusers may additionally create staff users
/// - `created_at`: When the user was created
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,

    /// SHA-256 hash of the bearer token (64 hex characters)
    ///
    /// When a request comes in with "Bearer abc123", we:
    /// 1. Hash "abc123" with SHA-256
    /// 2. Look up this hash in the database
    /// 3. If found, authenticate the request as this user
    pub token_hash: String,

    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub token_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Request body for creating a new user.
///
/// # JSON Example
///
/// ```json
/// {
///   "username": "georginahazel",
///   "is_staff": false
/// }
/// ```
///
/// `is_staff` is only honored when the caller is a superuser.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,

    #[serde(default)]
    pub is_staff: bool,
}

/// Response body for user endpoints.
///
/// # Security Note
///
/// The `token` field is ONLY included when creating a new user.
/// It is never returned in list/get operations.
///
/// # Example (Create Response)
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "username": "georginahazel",
///   "is_staff": false,
///   "created_at": "2025-12-20T10:00:00Z",
///   "token": "a1b2c3d4e5f6..."
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_staff: user.is_staff,
            created_at: user.created_at,
            token: None, // Never include the token by default
        }
    }
}

impl UserResponse {
    /// Create response with the plaintext token included (only on creation).
    pub fn with_token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }
}

/// Hash a bearer token the way it is stored in `users.token_hash`.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a fresh bearer token: 64 hex characters (32 random bytes).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}
