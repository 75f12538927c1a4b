//! Lock-guarded account service.
//!
//! Wraps another [`AccountService`] so that mutating operations run while
//! holding the account lock. Account creation locks the number sequence
//! because the new account number is not known until it is allocated;
//! closure locks the account being closed. Reads pass straight through.

use async_trait::async_trait;
use std::sync::Arc;

use common::AppResult;
use domain::{
    account_lock_key, Account, AccountCreated, AccountSummary, AccountUnregistered,
    ACCOUNT_SEQUENCE_LOCK_KEY,
};

use super::account_service::AccountService;
use crate::lock::AccountLockService;

/// Account service decorator serializing mutations per lock key.
pub struct LockedAccountService {
    inner: Arc<dyn AccountService>,
    locks: Arc<AccountLockService>,
}

impl LockedAccountService {
    pub fn new(inner: Arc<dyn AccountService>, locks: Arc<AccountLockService>) -> Self {
        Self { inner, locks }
    }
}

#[async_trait]
impl AccountService for LockedAccountService {
    async fn create_account(
        &self,
        user_id: i64,
        initial_balance: i64,
    ) -> AppResult<AccountCreated> {
        self.locks
            .with_lock(ACCOUNT_SEQUENCE_LOCK_KEY, || {
                self.inner.create_account(user_id, initial_balance)
            })
            .await
    }

    async fn get_accounts_by_user_id(&self, user_id: i64) -> AppResult<Vec<AccountSummary>> {
        self.inner.get_accounts_by_user_id(user_id).await
    }

    async fn get_account(&self, id: i64) -> AppResult<Account> {
        self.inner.get_account(id).await
    }

    async fn delete_account(
        &self,
        user_id: i64,
        account_number: &str,
    ) -> AppResult<AccountUnregistered> {
        let key = account_lock_key(account_number);
        self.locks
            .with_lock(&key, || self.inner.delete_account(user_id, account_number))
            .await
    }
}
