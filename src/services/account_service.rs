//! Bank account opening and lookup.

use uuid::Uuid;

use crate::{
    error::AppError,
    models::{account::Account, transfer::AmountInput},
    storage::BankStore,
};

/// Open a bank account for `user_id`.
///
/// The opening balance defaults to zero and follows the same parsing rules as
/// transfer amounts, except that zero is allowed.
///
/// # Errors
///
/// - `InvalidAmount`: Opening balance is malformed or negative
/// - `UserNotFound`: Owner doesn't exist
pub async fn open_account(
    store: &dyn BankStore,
    user_id: Uuid,
    initial_balance: Option<&AmountInput>,
) -> Result<Account, AppError> {
    let balance = match initial_balance {
        Some(raw) => raw.parse_non_negative()?,
        None => rust_decimal::Decimal::new(0, 2),
    };

    let account = store.create_account(user_id, balance).await?;
    tracing::info!(account_id = %account.id, %user_id, %balance, "account opened");

    Ok(account)
}

pub async fn get_account(store: &dyn BankStore, account_id: Uuid) -> Result<Account, AppError> {
    store
        .find_account(account_id)
        .await?
        .ok_or(AppError::AccountNotFound)
}

pub async fn list_accounts(store: &dyn BankStore) -> Result<Vec<Account>, AppError> {
    store.list_accounts().await
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{services::user_service, storage::memory::MemoryStore};

    #[tokio::test]
    async fn opens_accounts_with_given_or_zero_balance() {
        let store = MemoryStore::new();
        let (user, _) = user_service::create_user(&store, "georginahazel", false)
            .await
            .unwrap();

        let funded = open_account(&store, user.id, Some(&"30.21".into()))
            .await
            .unwrap();
        let empty = open_account(&store, user.id, None).await.unwrap();

        assert_eq!(funded.balance, dec!(30.21));
        assert_eq!(empty.balance, dec!(0));
        assert_eq!(list_accounts(&store).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn lists_accounts_of_every_owner_oldest_first() {
        let store = MemoryStore::new();
        let (first, _) = user_service::create_user(&store, "first", false)
            .await
            .unwrap();
        let (second, _) = user_service::create_user(&store, "second", false)
            .await
            .unwrap();
        open_account(&store, first.id, None).await.unwrap();
        open_account(&store, second.id, None).await.unwrap();

        let owners: Vec<_> = list_accounts(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|account| account.user_id)
            .collect();
        assert_eq!(owners, [first.id, second.id]);
    }

    #[tokio::test]
    async fn rejects_negative_balance_and_unknown_owner() {
        let store = MemoryStore::new();
        let (user, _) = user_service::create_user(&store, "owner", false)
            .await
            .unwrap();

        let err = open_account(&store, user.id, Some(&"-1".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount(_)));

        let err = open_account(&store, Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }

    #[tokio::test]
    async fn unknown_account_is_not_found() {
        let store = MemoryStore::new();
        let err = get_account(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::AccountNotFound));
    }
}
