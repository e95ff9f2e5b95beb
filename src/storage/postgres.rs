//! PostgreSQL implementation of the storage traits.
//!
//! Atomic units are plain sqlx transactions. Account rows are locked with
//! `SELECT ... FOR UPDATE`, so concurrent transfers touching the same account
//! wait for each other while transfers over disjoint accounts do not.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        account::{Account, LockedAccount},
        history::HistoryEntry,
        user::{NewUser, User},
    },
    storage::{BankStore, StoreTransaction},
};

const USER_COLUMNS: &str = "id, username, token_hash, is_staff, is_superuser, created_at";
const ACCOUNT_COLUMNS: &str = "id, user_id, balance, created_at, updated_at";
const HISTORY_COLUMNS: &str = "id, seq, bank_account_id, performed_at, description";

/// Store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BankStore for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, token_hash, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.token_hash)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::UsernameTaken
            }
            other => AppError::Persistence(other),
        })
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, username"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create_account(&self, user_id: Uuid, balance: Decimal) -> Result<Account, AppError> {
        sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO bank_accounts (user_id, balance)
            VALUES ($1, $2)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(balance)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::UserNotFound
            }
            other => AppError::Persistence(other),
        })
    }

    async fn find_account(&self, account_id: Uuid) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM bank_accounts WHERE id = $1"
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM bank_accounts ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    async fn list_history(&self, account_id: Uuid) -> Result<Vec<HistoryEntry>, AppError> {
        // seq is drawn while the account row is locked, so it follows the
        // order in which transfers were applied; performed_at need not
        let entries = sqlx::query_as::<_, HistoryEntry>(&format!(
            r#"
            SELECT {HISTORY_COLUMNS}
            FROM balance_history
            WHERE bank_account_id = $1
            ORDER BY seq
            "#
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgStoreTransaction { tx }))
    }
}

/// A database transaction. sqlx rolls it back when dropped uncommitted.
pub struct PgStoreTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTransaction for PgStoreTransaction {
    async fn lock_accounts(&mut self, ids: &[Uuid]) -> Result<Vec<LockedAccount>, AppError> {
        let mut ordered = ids.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut locked = Vec::with_capacity(ordered.len());
        for id in ordered {
            // FOR UPDATE OF a: lock the account row only, not its owner
            let row = sqlx::query_as::<_, LockedAccount>(
                r#"
                SELECT a.id, a.user_id, u.username, a.balance
                FROM bank_accounts a
                JOIN users u ON u.id = a.user_id
                WHERE a.id = $1
                FOR UPDATE OF a
                "#,
            )
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

            if let Some(account) = row {
                locked.push(account);
            }
        }

        Ok(locked)
    }

    async fn update_balance(
        &mut self,
        account_id: Uuid,
        balance: Decimal,
    ) -> Result<(), AppError> {
        let updated = sqlx::query(
            "UPDATE bank_accounts SET balance = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(balance)
        .bind(account_id)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::AccountNotFound);
        }

        Ok(())
    }

    async fn insert_history(
        &mut self,
        account_id: Uuid,
        description: &str,
    ) -> Result<HistoryEntry, AppError> {
        let entry = sqlx::query_as::<_, HistoryEntry>(&format!(
            r#"
            INSERT INTO balance_history (bank_account_id, description)
            VALUES ($1, $2)
            RETURNING {HISTORY_COLUMNS}
            "#
        ))
        .bind(account_id)
        .bind(description)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(entry)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let PgStoreTransaction { tx } = *self;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        let PgStoreTransaction { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
