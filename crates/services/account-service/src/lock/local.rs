//! In-process lock provider.
//!
//! Same contract as the Redis provider (owner tokens, expiry after the hold
//! bound) but only valid while a single process serves accounts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use uuid::Uuid;

use common::{AppError, AppResult};

use super::provider::{DistributedLock, LockProvider};

struct Holder {
    token: Uuid,
    expires_at: Instant,
}

type Holders = Arc<Mutex<HashMap<String, Holder>>>;

/// In-memory lock table.
#[derive(Clone)]
pub struct LocalLockProvider {
    holders: Holders,
    retry_delay: Duration,
}

impl LocalLockProvider {
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            holders: Arc::new(Mutex::new(HashMap::new())),
            retry_delay,
        }
    }

    /// Check if the key is held by anyone right now.
    pub async fn is_locked(&self, key: &str) -> bool {
        let holders = self.holders.lock().await;
        holders
            .get(key)
            .is_some_and(|holder| holder.expires_at > Instant::now())
    }
}

impl Default for LocalLockProvider {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl LockProvider for LocalLockProvider {
    fn get_lock(&self, key: &str) -> Arc<dyn DistributedLock> {
        Arc::new(LocalLock {
            holders: self.holders.clone(),
            key: key.to_string(),
            token: Uuid::new_v4(),
            retry_delay: self.retry_delay,
        })
    }
}

/// One owner of an in-memory lock key.
pub struct LocalLock {
    holders: Holders,
    key: String,
    token: Uuid,
    retry_delay: Duration,
}

impl LocalLock {
    async fn try_acquire(&self, hold: Duration) -> bool {
        let mut holders = self.holders.lock().await;
        let now = Instant::now();

        if let Some(holder) = holders.get(&self.key) {
            if holder.expires_at > now {
                return false;
            }
        }

        holders.insert(
            self.key.clone(),
            Holder {
                token: self.token,
                expires_at: now + hold,
            },
        );
        true
    }
}

#[async_trait]
impl DistributedLock for LocalLock {
    async fn try_lock(&self, wait: Duration, hold: Duration) -> AppResult<bool> {
        let deadline = Instant::now() + wait;

        loop {
            if self.try_acquire(hold).await {
                tracing::debug!(key = %self.key, "Lock acquired");
                return Ok(true);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            sleep(self.retry_delay.min(deadline - now)).await;
        }
    }

    async fn unlock(&self) -> AppResult<()> {
        let mut holders = self.holders.lock().await;

        match holders.get(&self.key) {
            Some(holder) if holder.token == self.token => {
                holders.remove(&self.key);
                tracing::debug!(key = %self.key, "Lock released");
                Ok(())
            }
            _ => Err(AppError::internal(format!(
                "Lock {} is not held by this owner",
                self.key
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_millis(50);
    const HOLD: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_second_owner_times_out() {
        let provider = LocalLockProvider::default();
        let first = provider.get_lock("ACLK:1000000000");
        let second = provider.get_lock("ACLK:1000000000");

        assert!(first.try_lock(WAIT, HOLD).await.unwrap());
        assert!(!second.try_lock(WAIT, HOLD).await.unwrap());
        assert!(provider.is_locked("ACLK:1000000000").await);
    }

    #[tokio::test]
    async fn test_release_lets_next_owner_in() {
        let provider = LocalLockProvider::default();
        let first = provider.get_lock("ACLK:1000000000");
        let second = provider.get_lock("ACLK:1000000000");

        assert!(first.try_lock(WAIT, HOLD).await.unwrap());
        first.unlock().await.unwrap();

        assert!(second.try_lock(WAIT, HOLD).await.unwrap());
    }

    #[tokio::test]
    async fn test_different_keys_do_not_contend() {
        let provider = LocalLockProvider::default();

        assert!(provider.get_lock("a").try_lock(WAIT, HOLD).await.unwrap());
        assert!(provider.get_lock("b").try_lock(WAIT, HOLD).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_lock_can_be_taken_over() {
        let provider = LocalLockProvider::default();
        let first = provider.get_lock("key");
        let second = provider.get_lock("key");

        assert!(first.try_lock(WAIT, Duration::from_millis(20)).await.unwrap());
        assert!(second.try_lock(Duration::from_millis(200), HOLD).await.unwrap());

        // The expired owner can no longer release the new holder's lock
        assert!(first.unlock().await.is_err());
        assert!(provider.is_locked("key").await);
    }

    #[tokio::test]
    async fn test_unlock_without_holding_fails() {
        let provider = LocalLockProvider::default();
        let lock = provider.get_lock("key");

        assert!(lock.unlock().await.is_err());
    }
}
