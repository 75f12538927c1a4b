//! Account Service Library
//!
//! This crate provides the account lifecycle (open, list, get, close) with
//! per-account distributed locking around mutations.

pub mod config;
pub mod infra;
pub mod lock;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use common::AppResult;

use crate::config::{AccountServiceConfig, LockBackend};
use crate::infra::Database;
use crate::lock::{AccountLockService, LocalLockProvider, LockProvider, RedisLockProvider};
use crate::repository::{AccountStore, AccountUserRepository, AccountUserStore};
use crate::service::{AccountManager, AccountService, LockedAccountService};

/// Wired application components.
pub struct AccountApp {
    /// Lock-guarded account service
    pub accounts: Arc<dyn AccountService>,
    /// User store, for seeding account owners
    pub users: Arc<dyn AccountUserRepository>,
}

impl AccountApp {
    /// Connect to the database and lock backend and wire the services.
    pub async fn connect(config: &AccountServiceConfig) -> AppResult<Self> {
        let db = Database::connect(&config.database).await?;
        let db_conn = db.get_connection();

        let provider: Arc<dyn LockProvider> = match config.lock_backend {
            LockBackend::Redis => {
                Arc::new(RedisLockProvider::connect(&config.cache, &config.lock).await?)
            }
            LockBackend::Local => {
                tracing::warn!("Using in-process locks; run a single instance only");
                Arc::new(LocalLockProvider::new(config.lock.retry_delay()))
            }
        };

        let users: Arc<dyn AccountUserRepository> = Arc::new(AccountUserStore::new(db_conn.clone()));
        let accounts = Arc::new(AccountStore::new(db_conn));
        let manager = Arc::new(AccountManager::new(accounts, users.clone()));
        let locks = Arc::new(AccountLockService::new(provider, config.lock.clone()));

        info!(backend = ?config.lock_backend, "Account service ready");

        Ok(Self {
            accounts: Arc::new(LockedAccountService::new(manager, locks)),
            users,
        })
    }
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> AppResult<()> {
    let config = AccountServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            db.ping().await?;
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Resetting database and running all migrations");
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
