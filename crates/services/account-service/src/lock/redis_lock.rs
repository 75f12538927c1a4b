//! Redis-backed distributed lock.
//!
//! Acquisition is `SET key token NX PX hold`, polled until the wait bound.
//! Release runs a compare-and-delete script so a handle can never remove a
//! lock that expired and was taken over by another owner.
//!
//! Each `SET` runs on its own task. A lock that lands after the waiter was
//! cancelled is released right away.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};
use tokio::sync::oneshot;
use tokio::time::{sleep, Instant};
use uuid::Uuid;

use common::{AppError, AppResult, CacheConfig, LockConfig};

use super::provider::{DistributedLock, LockProvider};

/// Cache key prefix for distributed locks
pub const CACHE_PREFIX_LOCK: &str = "lock:";

const RELEASE_SCRIPT: &str = r#"
    if redis.call("GET", KEYS[1]) == ARGV[1] then
        return redis.call("DEL", KEYS[1])
    else
        return 0
    end
"#;

/// Lock provider sharing one Redis connection across handles.
#[derive(Clone)]
pub struct RedisLockProvider {
    connection: ConnectionManager,
    retry_delay: Duration,
}

impl RedisLockProvider {
    /// Connect to Redis.
    pub async fn connect(cache: &CacheConfig, lock: &LockConfig) -> AppResult<Self> {
        let client = Client::open(cache.url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis lock provider connected");

        Ok(Self {
            connection,
            retry_delay: lock.retry_delay(),
        })
    }
}

impl LockProvider for RedisLockProvider {
    fn get_lock(&self, key: &str) -> Arc<dyn DistributedLock> {
        Arc::new(RedisLock {
            connection: self.connection.clone(),
            key: lock_key(key),
            token: Uuid::new_v4().to_string(),
            retry_delay: self.retry_delay,
        })
    }
}

/// Redis key backing the lock for `key`
pub fn lock_key(key: &str) -> String {
    format!("{}{}", CACHE_PREFIX_LOCK, key)
}

/// One owner of a Redis lock key.
pub struct RedisLock {
    connection: ConnectionManager,
    key: String,
    token: String,
    retry_delay: Duration,
}

async fn set_nx(
    conn: &mut ConnectionManager,
    key: &str,
    token: &str,
    hold_ms: u64,
) -> AppResult<bool> {
    let reply: Option<String> = redis::cmd("SET")
        .arg(key)
        .arg(token)
        .arg("NX")
        .arg("PX")
        .arg(hold_ms)
        .query_async(conn)
        .await?;

    Ok(reply.is_some())
}

async fn compare_and_delete(
    conn: &mut ConnectionManager,
    key: &str,
    token: &str,
) -> AppResult<bool> {
    let released: i32 = redis::cmd("EVAL")
        .arg(RELEASE_SCRIPT)
        .arg(1)
        .arg(key)
        .arg(token)
        .query_async(conn)
        .await?;

    Ok(released == 1)
}

/// Run `acquire` on its own task and hand the outcome back to the caller.
///
/// If the caller stops waiting after the acquisition was issued, a successful
/// acquisition is undone with `release` instead of lingering until expiry.
async fn detached_acquire<A, R>(acquire: A, release: R) -> AppResult<bool>
where
    A: Future<Output = AppResult<bool>> + Send + 'static,
    R: Future<Output = AppResult<bool>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let outcome = acquire.await;
        if let Err(Ok(true)) = tx.send(outcome) {
            match release.await {
                Ok(_) => tracing::debug!("Released lock acquired for an abandoned waiter"),
                Err(e) => tracing::warn!(error = %e, "Failed to release abandoned lock"),
            }
        }
    });

    rx.await
        .map_err(|_| AppError::internal("Lock acquisition task ended without a result"))?
}

impl RedisLock {
    async fn try_set(&self, hold: Duration) -> AppResult<bool> {
        let hold_ms = u64::try_from(hold.as_millis()).unwrap_or(u64::MAX).max(1);

        let mut set_conn = self.connection.clone();
        let set_key = self.key.clone();
        let set_token = self.token.clone();
        let mut release_conn = self.connection.clone();
        let release_key = self.key.clone();
        let release_token = self.token.clone();

        detached_acquire(
            async move { set_nx(&mut set_conn, &set_key, &set_token, hold_ms).await },
            async move { compare_and_delete(&mut release_conn, &release_key, &release_token).await },
        )
        .await
    }
}

#[async_trait]
impl DistributedLock for RedisLock {
    async fn try_lock(&self, wait: Duration, hold: Duration) -> AppResult<bool> {
        let deadline = Instant::now() + wait;

        loop {
            if self.try_set(hold).await? {
                tracing::debug!(key = %self.key, token = %self.token, "Lock acquired");
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
        let mut conn = self.connection.clone();

        if compare_and_delete(&mut conn, &self.key, &self.token).await? {
            tracing::debug!(key = %self.key, "Lock released");
            Ok(())
        } else {
            Err(AppError::internal(format!(
                "Lock {} is not held by this owner",
                self.key
            )))
        }
    }
}
