//! Transfer service - Core business logic for moving money between accounts.
//!
//! This service handles:
//! - Transfer validation (self transfers, unknown accounts, amounts, funds)
//! - Atomic balance updates
//! - Balance history entries for both sides
//! - History retrieval
//!
//! # Atomicity Guarantees
//!
//! Both balance updates and both history entries go through one
//! `StoreTransaction`. Either all four writes commit or none of them do.
//!
//! # Concurrency
//!
//! Both account rows are locked (ascending id order) before the source balance
//! is checked, so two transfers debiting the same account cannot both pass
//! validation against the same stale balance.

use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        account::LockedAccount,
        history::HistoryEntry,
        transfer::{AmountInput, TransferOutcome, max_amount},
    },
    storage::{BankStore, StoreTransaction},
};

/// Transfer `amount` from one account to another.
///
/// # Process
///
/// 1. Reject transfers to the same account
/// 2. Start a unit of work and lock both accounts
/// 3. Parse and validate the amount
/// 4. Check the source balance and the destination limit
/// 5. Write both balances and both history entries
/// 6. Commit (or roll back on any error)
///
/// # Returns
///
/// The new balances of both accounts, with two fractional digits.
///
/// # Errors
///
/// Checked in this order:
/// - `SelfTransfer`: Source and destination are the same account
/// - `AccountNotFound`: Either account doesn't exist
/// - `InvalidAmount`: Amount is malformed, zero or negative
/// - `InsufficientFunds`: Amount exceeds the source balance
/// - `BalanceLimitExceeded`: Destination balance would exceed 99,999,999.99
/// - `Persistence`: Storage error; nothing was applied
pub async fn transfer(
    store: &dyn BankStore,
    from_account_id: Uuid,
    to_account_id: Uuid,
    amount: &AmountInput,
) -> Result<TransferOutcome, AppError> {
    if from_account_id == to_account_id {
        return Err(AppError::SelfTransfer);
    }

    let mut tx = store.begin().await?;

    // Lock both rows; the store orders the locks by id
    let locked = tx.lock_accounts(&[from_account_id, to_account_id]).await?;
    let (from, to) = match (
        find_locked(&locked, from_account_id),
        find_locked(&locked, to_account_id),
    ) {
        (Some(from), Some(to)) => (from, to),
        _ => return Err(abort(tx, AppError::AccountNotFound).await),
    };

    let amount = match amount.parse_positive() {
        Ok(amount) => amount,
        Err(err) => return Err(abort(tx, err).await),
    };

    if amount > from.balance {
        tracing::info!(
            %from_account_id,
            %to_account_id,
            %amount,
            "transfer rejected: insufficient funds"
        );
        return Err(abort(tx, AppError::InsufficientFunds).await);
    }

    let mut from_balance = from.balance - amount;
    let mut to_balance = to.balance + amount;
    from_balance.rescale(2);
    to_balance.rescale(2);

    if to_balance > max_amount() {
        tracing::info!(
            %from_account_id,
            %to_account_id,
            %amount,
            "transfer rejected: destination balance limit"
        );
        return Err(abort(tx, AppError::BalanceLimitExceeded).await);
    }

    // Any error below drops `tx` uncommitted, which rolls everything back
    tx.update_balance(from.id, from_balance).await?;
    tx.update_balance(to.id, to_balance).await?;

    tx.insert_history(
        from.id,
        &format!("Withdrawn {amount} for {}#{}", to.username, to.id),
    )
    .await?;
    tx.insert_history(
        to.id,
        &format!("Deposited {amount} by {}#{}", from.username, from.id),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        %from_account_id,
        %to_account_id,
        %amount,
        "transfer committed"
    );

    Ok(TransferOutcome {
        from_balance,
        to_balance,
    })
}

/// History of one account, oldest entry first.
///
/// # Errors
///
/// - `AccountNotFound`: Account doesn't exist
pub async fn history(
    store: &dyn BankStore,
    account_id: Uuid,
) -> Result<Vec<HistoryEntry>, AppError> {
    store
        .find_account(account_id)
        .await?
        .ok_or(AppError::AccountNotFound)?;

    store.list_history(account_id).await
}

/// Roll back a unit that failed a business rule and hand back the rule's error.
///
/// A failed rollback is only logged; the uncommitted transaction is discarded
/// when its connection is released either way.
async fn abort(tx: Box<dyn StoreTransaction>, err: AppError) -> AppError {
    if let Err(rollback_err) = tx.rollback().await {
        tracing::warn!(error = %rollback_err, "rollback after rejected transfer failed");
    }
    err
}

fn find_locked(locked: &[LockedAccount], id: Uuid) -> Option<LockedAccount> {
    locked.iter().find(|account| account.id == id).cloned()
}
