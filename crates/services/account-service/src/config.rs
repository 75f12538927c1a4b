//! Account service configuration.

use std::env;

use common::{CacheConfig, DatabaseConfig, LockConfig};

/// Which lock provider guards account mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockBackend {
    /// Redis-backed lock shared by every process
    Redis,
    /// In-process lock, only valid for a single running instance
    Local,
}

impl From<&str> for LockBackend {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "local" => LockBackend::Local,
            _ => LockBackend::Redis,
        }
    }
}

/// Account service configuration.
#[derive(Debug, Clone)]
pub struct AccountServiceConfig {
    /// Database connection settings
    pub database: DatabaseConfig,
    /// Redis connection used for distributed locks
    pub cache: CacheConfig,
    /// Lock provider selection
    pub lock_backend: LockBackend,
    /// Lock wait and hold bounds
    pub lock: LockConfig,
}

impl AccountServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            database: DatabaseConfig {
                url: env::var("ACCOUNT_SERVICE_DATABASE_URL")
                    .or_else(|_| env::var("DATABASE_URL"))
                    .unwrap_or(defaults.database.url),
                max_connections: env_u64("DATABASE_MAX_CONNECTIONS")
                    .and_then(|v| u32::try_from(v).ok())
                    .unwrap_or(defaults.database.max_connections),
                min_connections: env_u64("DATABASE_MIN_CONNECTIONS")
                    .and_then(|v| u32::try_from(v).ok())
                    .unwrap_or(defaults.database.min_connections),
            },
            cache: CacheConfig {
                url: env::var("ACCOUNT_SERVICE_REDIS_URL")
                    .or_else(|_| env::var("REDIS_URL"))
                    .unwrap_or(defaults.cache.url),
            },
            lock_backend: env::var("ACCOUNT_LOCK_BACKEND")
                .map(|v| LockBackend::from(v.as_str()))
                .unwrap_or(defaults.lock_backend),
            lock: LockConfig {
                wait_ms: env_u64("ACCOUNT_LOCK_WAIT_MS").unwrap_or(defaults.lock.wait_ms),
                hold_ms: env_u64("ACCOUNT_LOCK_HOLD_MS").unwrap_or(defaults.lock.hold_ms),
                retry_delay_ms: env_u64("ACCOUNT_LOCK_RETRY_DELAY_MS")
                    .unwrap_or(defaults.lock.retry_delay_ms),
            },
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Default for AccountServiceConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            lock_backend: LockBackend::Redis,
            lock: LockConfig::default(),
        }
    }
}
