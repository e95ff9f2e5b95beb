//! # Storage Traits
//!
//! The services never talk to a connection pool directly. They receive a
//! `BankStore` and open units of work through it, so the same business logic
//! runs against PostgreSQL in production and against an in-memory store in
//! tests.
//!
//! A `StoreTransaction` is one atomic unit. Dropping it without calling
//! `commit` discards every change made through it.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        account::{Account, LockedAccount},
        history::HistoryEntry,
        user::{NewUser, User},
    },
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

/// Reads, single-row writes, and the entry point for atomic units.
#[async_trait]
pub trait BankStore: Send + Sync {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), AppError>;

    /// Insert a user. Fails with `UsernameTaken` on a duplicate username.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Look up the user owning a token, by the token's SHA-256 hash.
    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>, AppError>;

    /// All users, oldest first.
    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// Open an account. Fails with `UserNotFound` if `user_id` does not exist.
    async fn create_account(&self, user_id: Uuid, balance: Decimal) -> Result<Account, AppError>;

    async fn find_account(&self, account_id: Uuid) -> Result<Option<Account>, AppError>;

    /// All accounts, oldest first.
    async fn list_accounts(&self) -> Result<Vec<Account>, AppError>;

    /// History of one account in the order its entries were written.
    async fn list_history(&self, account_id: Uuid) -> Result<Vec<HistoryEntry>, AppError>;

    /// Start an atomic unit of work.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, AppError>;
}

/// One atomic unit of work over accounts and their history.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Lock the given accounts for the rest of the unit and return the ones
    /// that exist.
    ///
    /// Locks are acquired one at a time in ascending id order, whatever order
    /// `ids` is in, so two units locking the same pair cannot deadlock.
    async fn lock_accounts(&mut self, ids: &[Uuid]) -> Result<Vec<LockedAccount>, AppError>;

    /// Overwrite the balance of a locked account.
    async fn update_balance(&mut self, account_id: Uuid, balance: Decimal)
    -> Result<(), AppError>;

    /// Append a history entry to an account.
    async fn insert_history(
        &mut self,
        account_id: Uuid,
        description: &str,
    ) -> Result<HistoryEntry, AppError>;

    /// Make every change of this unit visible at once.
    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    /// Discard every change of this unit and release its locks.
    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}
