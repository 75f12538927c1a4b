//! Account service - Handles the account lifecycle.
//!
//! SOLID (SRP): Handles account-related use cases only. Mutual exclusion
//! between concurrent writers is layered on top by `LockedAccountService`.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use common::{AppError, AppResult, OptionExt};
use domain::{
    Account, AccountCreated, AccountNumber, AccountSummary, AccountUnregistered, AccountUser,
    ErrorCode, MAX_ACCOUNTS_PER_USER,
};

use crate::repository::{AccountRepository, AccountUserRepository};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Open a new account for the user with the next account number
    async fn create_account(&self, user_id: i64, initial_balance: i64)
        -> AppResult<AccountCreated>;

    /// List the user's accounts in storage order (closed ones included)
    async fn get_accounts_by_user_id(&self, user_id: i64) -> AppResult<Vec<AccountSummary>>;

    /// Get account by internal ID
    async fn get_account(&self, id: i64) -> AppResult<Account>;

    /// Close the user's account
    async fn delete_account(
        &self,
        user_id: i64,
        account_number: &str,
    ) -> AppResult<AccountUnregistered>;
}

/// Concrete implementation of AccountService using repositories.
pub struct AccountManager {
    accounts: Arc<dyn AccountRepository>,
    users: Arc<dyn AccountUserRepository>,
}

impl AccountManager {
    /// Create new account service instance with repositories
    pub fn new(accounts: Arc<dyn AccountRepository>, users: Arc<dyn AccountUserRepository>) -> Self {
        Self { accounts, users }
    }

    async fn find_user(&self, user_id: i64) -> AppResult<AccountUser> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_account(ErrorCode::UserNotFound)
    }

    async fn validate_create_account(&self, user: &AccountUser) -> AppResult<()> {
        if self.accounts.count_by_account_user(user).await? >= MAX_ACCOUNTS_PER_USER {
            return Err(AppError::account(ErrorCode::MaxAccountsPerUser));
        }
        Ok(())
    }

    async fn next_account_number(&self) -> AppResult<String> {
        let latest = self.accounts.find_first_by_order_by_id_desc().await?;
        let number = AccountNumber::following(latest.as_ref().map(|a| a.account_number.as_str()))?;
        Ok(number.to_string())
    }
}

#[async_trait]
impl AccountService for AccountManager {
    async fn create_account(
        &self,
        user_id: i64,
        initial_balance: i64,
    ) -> AppResult<AccountCreated> {
        if initial_balance < 0 {
            return Err(AppError::account_with_message(
                ErrorCode::InvalidRequest,
                "Initial balance must not be negative",
            ));
        }

        let user = self.find_user(user_id).await?;
        self.validate_create_account(&user).await?;

        let account_number = self.next_account_number().await?;
        let account = Account::open(user, account_number, initial_balance, Utc::now())?;

        let saved = self.accounts.save(account).await?;
        tracing::info!(
            user_id = saved.account_user.id,
            account_number = %saved.account_number,
            "Account created"
        );

        Ok(AccountCreated::from(&saved))
    }

    async fn get_accounts_by_user_id(&self, user_id: i64) -> AppResult<Vec<AccountSummary>> {
        let user = self.find_user(user_id).await?;
        let accounts = self.accounts.find_all_by_account_user(&user).await?;

        Ok(accounts.into_iter().map(AccountSummary::from).collect())
    }

    async fn get_account(&self, id: i64) -> AppResult<Account> {
        if id <= 0 {
            return Err(AppError::invalid_argument("Minus"));
        }

        self.accounts
            .find_by_id(id)
            .await?
            .ok_or_account(ErrorCode::AccountNotFound)
    }

    async fn delete_account(
        &self,
        user_id: i64,
        account_number: &str,
    ) -> AppResult<AccountUnregistered> {
        let user = self.find_user(user_id).await?;
        let mut account = self
            .accounts
            .find_by_account_number(account_number)
            .await?
            .ok_or_account(ErrorCode::AccountNotFound)?;

        if !account.is_owned_by(user.id) {
            return Err(AppError::account(ErrorCode::UserAccountUnMatch));
        }

        let unregistered_at = Utc::now();
        account.unregister(unregistered_at)?;

        let saved = self.accounts.save(account).await?;
        tracing::info!(
            user_id = saved.account_user.id,
            account_number = %saved.account_number,
            "Account unregistered"
        );

        Ok(AccountUnregistered {
            user_id: saved.account_user.id,
            account_number: saved.account_number,
            unregistered_at: saved.unregistered_at.unwrap_or(unregistered_at),
        })
    }
}
