//! User management: creation, lookup and the bootstrap superuser.

use uuid::Uuid;

use crate::{
    error::AppError,
    models::user::{NewUser, User, generate_token, hash_token},
    storage::BankStore,
};

const MAX_USERNAME_LEN: usize = 150;

/// Create a user and issue its bearer token.
///
/// # Process
///
/// 1. Validate the username
/// 2. Generate a random token (32 bytes, hex encoded)
/// 3. Store the user with the token's SHA-256 hash
/// 4. Return the user together with the plaintext token (only time it's available)
///
/// # Errors
///
/// - `InvalidRequest`: Username is empty, too long, or has disallowed characters
/// - `UsernameTaken`: Username already exists
pub async fn create_user(
    store: &dyn BankStore,
    username: &str,
    is_staff: bool,
) -> Result<(User, String), AppError> {
    let username = validate_username(username)?;
    let token = generate_token();

    let user = store
        .create_user(NewUser {
            username,
            token_hash: hash_token(&token),
            is_staff,
            is_superuser: false,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, is_staff, "user created");

    Ok((user, token))
}

/// Make sure a superuser named `username` exists, authenticated by `token`.
///
/// Runs once at startup. An existing user with that name is left untouched.
pub async fn ensure_superuser(
    store: &dyn BankStore,
    username: &str,
    token: &str,
) -> Result<User, AppError> {
    let username = validate_username(username)?;
    if let Some(existing) = store.find_user_by_username(&username).await? {
        return Ok(existing);
    }

    let user = store
        .create_user(NewUser {
            username,
            token_hash: hash_token(token),
            is_staff: true,
            is_superuser: true,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "superuser created");
    Ok(user)
}

pub async fn get_user(store: &dyn BankStore, user_id: Uuid) -> Result<User, AppError> {
    store
        .find_user(user_id)
        .await?
        .ok_or(AppError::UserNotFound)
}

pub async fn list_users(store: &dyn BankStore) -> Result<Vec<User>, AppError> {
    store.list_users().await
}

/// Trim and check a username: 1-150 characters of letters, digits and `@.+-_`.
fn validate_username(username: &str) -> Result<String, AppError> {
    let username = username.trim();

    if username.is_empty() {
        return Err(AppError::InvalidRequest(
            "username must not be empty".to_string(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::InvalidRequest(format!(
            "username may not exceed {MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Err(AppError::InvalidRequest(
            "username may only contain letters, digits and @/./+/-/_".to_string(),
        ));
    }

    Ok(username.to_string())
}
