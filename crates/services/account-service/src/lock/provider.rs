//! Lock provider abstraction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use common::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Handle on one named lock.
///
/// A handle identifies a single owner: only the handle that acquired the
/// lock can release it.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Try to acquire the lock, waiting at most `wait`. Once acquired the lock
    /// expires on its own after `hold`.
    ///
    /// Returns `Ok(false)` when the wait bound elapses.
    async fn try_lock(&self, wait: Duration, hold: Duration) -> AppResult<bool>;

    /// Release the lock held by this handle.
    async fn unlock(&self) -> AppResult<()>;
}

/// Source of named lock handles.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait LockProvider: Send + Sync {
    /// Get a fresh handle for the lock named `key`.
    fn get_lock(&self, key: &str) -> Arc<dyn DistributedLock>;
}
