//! Account lock orchestration.
//!
//! Acquires the lock for an account key with the configured wait and hold
//! bounds, runs the protected operation and always releases afterwards.
//! Release failures are logged and never override the operation's outcome.

use std::future::Future;
use std::sync::Arc;

use common::{AppError, AppResult, LockConfig};
use domain::ErrorCode;

use super::provider::{DistributedLock, LockProvider};

/// Lock service guarding account-mutating operations.
pub struct AccountLockService {
    provider: Arc<dyn LockProvider>,
    config: LockConfig,
}

impl AccountLockService {
    pub fn new(provider: Arc<dyn LockProvider>, config: LockConfig) -> Self {
        Self { provider, config }
    }

    /// Acquire the lock for `key`.
    ///
    /// Fails with `AccountTransactionLock` when the lock is still held after
    /// the wait bound, or when the provider reports an error. No retry.
    pub async fn lock(&self, key: &str) -> AppResult<AccountLockGuard> {
        let lock = self.provider.get_lock(key);
        tracing::debug!(key = %key, "Acquiring account lock");

        match lock.try_lock(self.config.wait(), self.config.hold()).await {
            Ok(true) => {
                tracing::debug!(key = %key, "Account lock acquired");
                Ok(AccountLockGuard {
                    key: key.to_string(),
                    lock: Some(lock),
                })
            }
            Ok(false) => {
                tracing::warn!(key = %key, wait_ms = self.config.wait_ms, "Account lock busy");
                Err(AppError::account(ErrorCode::AccountTransactionLock))
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Account lock acquisition failed");
                Err(AppError::account(ErrorCode::AccountTransactionLock))
            }
        }
    }

    /// Release a held lock. Failures are logged, not returned.
    pub async fn unlock(&self, guard: AccountLockGuard) {
        let key = guard.key.clone();
        match guard.release().await {
            Ok(()) => tracing::debug!(key = %key, "Account lock released"),
            Err(e) => tracing::error!(key = %key, error = %e, "Failed to release account lock"),
        }
    }

    /// Run `operation` while holding the lock for `key`.
    pub async fn with_lock<T, F, Fut>(&self, key: &str, operation: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
        T: Send,
    {
        let guard = self.lock(key).await?;
        let result = operation().await;
        self.unlock(guard).await;
        result
    }
}

/// Held account lock.
///
/// Dropping a guard that was not released (panic, cancelled task) schedules
/// the release on the current runtime. Without a runtime the lock is left to
/// expire at the hold bound.
pub struct AccountLockGuard {
    key: String,
    lock: Option<Arc<dyn DistributedLock>>,
}

impl AccountLockGuard {
    /// Lock key this guard holds
    pub fn key(&self) -> &str {
        &self.key
    }

    async fn release(mut self) -> AppResult<()> {
        match self.lock.take() {
            Some(lock) => lock.unlock().await,
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for AccountLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountLockGuard")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl Drop for AccountLockGuard {
    fn drop(&mut self) {
        let Some(lock) = self.lock.take() else {
            return;
        };
        let key = std::mem::take(&mut self.key);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = lock.unlock().await {
                        tracing::error!(key = %key, error = %e, "Failed to release lock on drop");
                    } else {
                        tracing::debug!(key = %key, "Lock released on drop");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(key = %key, "No runtime to release lock; it will expire");
            }
        }
    }
}
