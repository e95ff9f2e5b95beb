//! Bank account data models and API request/response types.
//!
//! This module defines:
//! - `Account`: Database entity representing a bank account
//! - `LockedAccount`: An account row read under a row lock inside a transfer
//! - `CreateAccountRequest`: Request body for opening accounts
//! - `AccountResponse`: Response body returned to clients

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::transfer::AmountInput;

/// Represents a bank account record from the database.
///
/// # Database Table
///
/// Maps to the `bank_accounts` table. Each account:
/// - Belongs to one user (via `user_id`); deleted with that user
/// - Has a fixed-point balance with two fractional digits
///
/// # Balance Storage
///
/// Balances are `NUMERIC(10, 2)` in PostgreSQL and `rust_decimal::Decimal`
/// in Rust, so arithmetic on them is exact.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Account {
    /// Unique identifier for this account
    pub id: Uuid,

    /// Foreign key to the owning user
    pub user_id: Uuid,

    /// Current balance
    ///
    /// Must be >= 0 (enforced by database CHECK constraint).
    pub balance: Decimal,

    /// Timestamp when account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of last balance update
    pub updated_at: DateTime<Utc>,
}

/// An account row locked for the duration of a transfer.
///
/// Carries the owner's username so history descriptions can name the
/// counterparty without a second query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LockedAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub balance: Decimal,
}

/// Request body for opening a new bank account.
///
/// # JSON Example
///
/// ```json
/// {
///   "user_id": "550e8400-e29b-41d4-a716-446655440000",
///   "initial_balance": "30.21"
/// }
/// ```
///
/// # Validation
///
/// - `user_id`: Required, must reference an existing user
/// - `initial_balance`: Optional, defaults to 0; accepts a JSON number or a
///   decimal string with at most two fractional digits
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub user_id: Uuid,

    #[serde(default)]
    pub initial_balance: Option<AmountInput>,
}

/// Response body for account endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "user_id": "660e8400-e29b-41d4-a716-446655440001",
///   "balance": "50.25",
///   "created_at": "2025-12-20T10:00:00Z",
///   "updated_at": "2025-12-20T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        let mut balance = account.balance;
        balance.rescale(2);

        Self {
            id: account.id,
            user_id: account.user_id,
            balance,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
