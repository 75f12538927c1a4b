//! Distributed locking for account mutations.

mod local;
mod provider;
mod redis_lock;
mod service;

pub use local::LocalLockProvider;
pub use provider::{DistributedLock, LockProvider};
pub use redis_lock::{RedisLockProvider, CACHE_PREFIX_LOCK};
pub use service::{AccountLockGuard, AccountLockService};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::{MockDistributedLock, MockLockProvider};
