//! In-memory implementation of the storage traits, used by tests.
//!
//! Mirrors the PostgreSQL locking discipline: every account has its own async
//! mutex, a unit of work acquires them in ascending id order and holds them
//! until it commits or is dropped. Writes are staged in the unit and applied
//! in one step on commit, so nothing is observable before that.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicI64, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        account::{Account, LockedAccount},
        history::HistoryEntry,
        user::{NewUser, User},
    },
    storage::{BankStore, StoreTransaction},
};

#[derive(Default)]
struct State {
    users: Vec<User>,
    accounts: Vec<Account>,
    history: Vec<HistoryEntry>,
}

/// Test store holding everything in process memory.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    locks: Arc<Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>>,
    /// Shared like a database sequence: drawn on insert, never rolled back.
    history_seq: Arc<AtomicI64>,
    /// Number of history inserts that succeed before one fails.
    fail_history_after: Arc<Mutex<Option<usize>>>,
    fail_next_rollback: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a history insert fail with a persistence error after `successes`
    /// more inserts have gone through.
    pub fn fail_history_insert_after(&self, successes: usize) {
        *self.fail_history_after.lock().unwrap() = Some(successes);
    }

    /// Make the next explicit rollback report a persistence error.
    pub fn fail_next_rollback(&self) {
        self.fail_next_rollback.store(true, Ordering::SeqCst);
    }

    fn account_lock(&self, account_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        self.locks
            .lock()
            .unwrap()
            .entry(account_id)
            .or_default()
            .clone()
    }
}

#[async_trait]
impl BankStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::UsernameTaken);
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            token_hash: user.token_hash,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created_at: Utc::now(),
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.token_hash == token_hash)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.state.lock().unwrap().users.clone())
    }

    async fn create_account(&self, user_id: Uuid, balance: Decimal) -> Result<Account, AppError> {
        let mut state = self.state.lock().unwrap();
        if !state.users.iter().any(|u| u.id == user_id) {
            return Err(AppError::UserNotFound);
        }

        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            user_id,
            balance,
            created_at: now,
            updated_at: now,
        };
        state.accounts.push(account.clone());
        Ok(account)
    }

    async fn find_account(&self, account_id: Uuid) -> Result<Option<Account>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.accounts.iter().find(|a| a.id == account_id).cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.state.lock().unwrap().accounts.clone())
    }

    async fn list_history(&self, account_id: Uuid) -> Result<Vec<HistoryEntry>, AppError> {
        let state = self.state.lock().unwrap();
        let mut entries: Vec<_> = state
            .history
            .iter()
            .filter(|h| h.bank_account_id == account_id)
            .cloned()
            .collect();
        entries.sort_by_key(|h| h.seq);
        Ok(entries)
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, AppError> {
        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            guards: Vec::new(),
            balances: Vec::new(),
            history: Vec::new(),
        }))
    }
}

/// Staged changes plus the account locks held by one unit of work.
pub struct MemoryTransaction {
    store: MemoryStore,
    guards: Vec<OwnedMutexGuard<()>>,
    balances: Vec<(Uuid, Decimal)>,
    history: Vec<HistoryEntry>,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn lock_accounts(&mut self, ids: &[Uuid]) -> Result<Vec<LockedAccount>, AppError> {
        let mut ordered = ids.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut locked = Vec::with_capacity(ordered.len());
        for id in ordered {
            let guard = self.store.account_lock(id).lock_owned().await;
            self.guards.push(guard);

            let state = self.store.state.lock().unwrap();
            if let Some(account) = state.accounts.iter().find(|a| a.id == id) {
                let username = state
                    .users
                    .iter()
                    .find(|u| u.id == account.user_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default();
                locked.push(LockedAccount {
                    id: account.id,
                    user_id: account.user_id,
                    username,
                    balance: account.balance,
                });
            }
        }

        Ok(locked)
    }

    async fn update_balance(
        &mut self,
        account_id: Uuid,
        balance: Decimal,
    ) -> Result<(), AppError> {
        let exists = self
            .store
            .state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .any(|a| a.id == account_id);
        if !exists {
            return Err(AppError::AccountNotFound);
        }

        self.balances.push((account_id, balance));
        Ok(())
    }

    async fn insert_history(
        &mut self,
        account_id: Uuid,
        description: &str,
    ) -> Result<HistoryEntry, AppError> {
        {
            let mut remaining = self.store.fail_history_after.lock().unwrap();
            match *remaining {
                Some(0) => {
                    *remaining = None;
                    return Err(AppError::Persistence(sqlx::Error::Protocol(
                        "injected history insert failure".to_string(),
                    )));
                }
                Some(n) => *remaining = Some(n - 1),
                None => {}
            }
        }

        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            seq: self.store.history_seq.fetch_add(1, Ordering::SeqCst) + 1,
            bank_account_id: account_id,
            performed_at: Utc::now(),
            description: description.to_string(),
        };
        self.history.push(entry.clone());
        Ok(entry)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryTransaction {
            store,
            guards,
            balances,
            history,
        } = *self;

        {
            let mut state = store.state.lock().unwrap();
            let now = Utc::now();
            for (account_id, balance) in balances {
                if let Some(account) = state.accounts.iter_mut().find(|a| a.id == account_id) {
                    account.balance = balance;
                    account.updated_at = now;
                }
            }
            state.history.extend(history);
        }

        drop(guards);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        // Staged writes and lock guards are dropped either way
        if self.store.fail_next_rollback.swap(false, Ordering::SeqCst) {
            return Err(AppError::Persistence(sqlx::Error::Protocol(
                "injected rollback failure".to_string(),
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::user::hash_token;

    #[tokio::test]
    async fn history_is_listed_in_insert_order_across_units() {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                username: "georginahazel".to_string(),
                token_hash: hash_token("georginahazel"),
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap();
        let id = store.create_account(user.id, dec!(0.00)).await.unwrap().id;

        let mut started_first = store.begin().await.unwrap();
        let mut started_second = store.begin().await.unwrap();
        started_second.insert_history(id, "applied first").await.unwrap();
        started_second.commit().await.unwrap();
        started_first.insert_history(id, "applied second").await.unwrap();
        started_first.commit().await.unwrap();

        let history = store.list_history(id).await.unwrap();
        let descriptions: Vec<_> = history.iter().map(|h| h.description.as_str()).collect();
        assert_eq!(descriptions, ["applied first", "applied second"]);
        assert!(history[0].seq < history[1].seq);
    }
}
