//! Account lifecycle integration tests.
//!
//! These tests wire the real services and lock orchestration on top of
//! in-memory repositories and the in-process lock provider, so they need no
//! database or Redis.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use account_service_lib::lock::{AccountLockService, LocalLockProvider};
use account_service_lib::repository::{AccountRepository, AccountUserRepository};
use account_service_lib::service::{AccountManager, AccountService, LockedAccountService};
use common::{AppResult, LockConfig};
use domain::{Account, AccountStatus, AccountUser, ErrorCode};

// =============================================================================
// In-memory repositories
// =============================================================================

#[derive(Default)]
struct InMemoryUsers {
    users: Mutex<Vec<AccountUser>>,
}

#[async_trait]
impl AccountUserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<AccountUser>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, name: String) -> AppResult<AccountUser> {
        let mut users = self.users.lock().await;
        let user = AccountUser::new(users.len() as i64 + 1, name);
        users.push(user.clone());
        Ok(user)
    }
}

/// Account table. Reads and writes yield to the scheduler so that
/// unsynchronized writers would interleave.
#[derive(Default)]
struct InMemoryAccounts {
    rows: Mutex<Vec<Account>>,
    saves: Mutex<usize>,
}

impl InMemoryAccounts {
    async fn save_count(&self) -> usize {
        *self.saves.lock().await
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Account>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|a| a.id == Some(id)).cloned())
    }

    async fn find_by_account_number(&self, account_number: &str) -> AppResult<Option<Account>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|a| a.account_number == account_number)
            .cloned())
    }

    async fn find_all_by_account_user(&self, user: &AccountUser) -> AppResult<Vec<Account>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|a| a.account_user.id == user.id)
            .cloned()
            .collect())
    }

    async fn count_by_account_user(&self, user: &AccountUser) -> AppResult<u64> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|a| a.account_user.id == user.id && a.account_status.is_in_use())
            .count() as u64)
    }

    async fn find_first_by_order_by_id_desc(&self) -> AppResult<Option<Account>> {
        let latest = {
            let rows = self.rows.lock().await;
            rows.iter().max_by_key(|a| a.id).cloned()
        };
        tokio::task::yield_now().await;
        Ok(latest)
    }

    async fn save(&self, mut account: Account) -> AppResult<Account> {
        tokio::task::yield_now().await;
        *self.saves.lock().await += 1;

        let mut rows = self.rows.lock().await;
        match account.id {
            Some(id) => {
                if let Some(row) = rows.iter_mut().find(|a| a.id == Some(id)) {
                    *row = account.clone();
                }
            }
            None => {
                account.id = Some(rows.len() as i64 + 1);
                rows.push(account.clone());
            }
        }
        Ok(account)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

struct Fixture {
    service: Arc<dyn AccountService>,
    accounts: Arc<InMemoryAccounts>,
    users: Arc<InMemoryUsers>,
    locks: Arc<AccountLockService>,
}

fn fixture(lock_config: LockConfig) -> Fixture {
    let accounts = Arc::new(InMemoryAccounts::default());
    let users = Arc::new(InMemoryUsers::default());
    let manager = Arc::new(AccountManager::new(accounts.clone(), users.clone()));
    let provider = Arc::new(LocalLockProvider::new(lock_config.retry_delay()));
    let locks = Arc::new(AccountLockService::new(provider, lock_config));

    Fixture {
        service: Arc::new(LockedAccountService::new(manager, locks.clone())),
        accounts,
        users,
        locks,
    }
}

fn patient_locks() -> LockConfig {
    LockConfig {
        wait_ms: 10_000,
        hold_ms: 15_000,
        retry_delay_ms: 1,
    }
}

fn impatient_locks() -> LockConfig {
    LockConfig {
        wait_ms: 50,
        hold_ms: 15_000,
        retry_delay_ms: 5,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_account_numbers_are_sequential() {
    let fx = fixture(patient_locks());
    let user = fx.users.create("POBI".to_string()).await.unwrap();

    let first = fx.service.create_account(user.id, 1000).await.unwrap();
    let second = fx.service.create_account(user.id, 2000).await.unwrap();

    assert_eq!(first.account_number, "1000000000");
    assert_eq!(second.account_number, "1000000001");
    assert_eq!(first.user_id, user.id);

    let listed = fx.service.get_accounts_by_user_id(user.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].balance, 1000);
    assert_eq!(listed[1].balance, 2000);
}

#[tokio::test]
async fn test_close_account_then_reclose_fails() {
    let fx = fixture(patient_locks());
    let user = fx.users.create("POBI".to_string()).await.unwrap();
    let created = fx.service.create_account(user.id, 0).await.unwrap();

    let closed = fx
        .service
        .delete_account(user.id, &created.account_number)
        .await
        .unwrap();
    assert_eq!(closed.account_number, created.account_number);
    assert_eq!(fx.accounts.save_count().await, 2);

    let stored = fx.service.get_account(1).await.unwrap();
    assert_eq!(stored.account_status, AccountStatus::Unregistered);
    assert_eq!(stored.unregistered_at, Some(closed.unregistered_at));

    let err = fx
        .service
        .delete_account(user.id, &created.account_number)
        .await
        .unwrap_err();
    assert!(err.is(ErrorCode::AccountAlreadyUnregistered));

    // Closed accounts stay in the listing
    let listed = fx.service.get_accounts_by_user_id(user.id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_only_live_accounts_count_toward_limit() {
    let fx = fixture(patient_locks());
    let user = fx.users.create("POBI".to_string()).await.unwrap();

    for _ in 0..10 {
        fx.service.create_account(user.id, 0).await.unwrap();
    }
    let err = fx.service.create_account(user.id, 0).await.unwrap_err();
    assert!(err.is(ErrorCode::MaxAccountsPerUser));

    fx.service.delete_account(user.id, "1000000004").await.unwrap();

    let reopened = fx.service.create_account(user.id, 0).await.unwrap();
    assert_eq!(reopened.account_number, "1000000010");
}

#[tokio::test]
async fn test_other_users_account_cannot_be_closed() {
    let fx = fixture(patient_locks());
    let pobi = fx.users.create("POBI".to_string()).await.unwrap();
    let harry = fx.users.create("HARRY".to_string()).await.unwrap();
    let created = fx.service.create_account(harry.id, 0).await.unwrap();

    let err = fx
        .service
        .delete_account(pobi.id, &created.account_number)
        .await
        .unwrap_err();

    assert!(err.is(ErrorCode::UserAccountUnMatch));
}

#[tokio::test]
async fn test_concurrent_creates_get_unique_numbers() {
    let fx = fixture(patient_locks());
    let mut user_ids = Vec::new();
    for i in 0..4 {
        user_ids.push(fx.users.create(format!("user-{}", i)).await.unwrap().id);
    }

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = fx.service.clone();
        let user_id = user_ids[i % user_ids.len()];
        handles.push(tokio::spawn(async move {
            service.create_account(user_id, 0).await
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        let created = handle.await.unwrap().unwrap();
        assert!(numbers.insert(created.account_number));
    }

    assert_eq!(numbers.len(), 20);
    assert!(numbers.contains("1000000000"));
    assert!(numbers.contains("1000000019"));
}

#[tokio::test]
async fn test_busy_account_lock_rejects_close() {
    let fx = fixture(impatient_locks());
    let user = fx.users.create("POBI".to_string()).await.unwrap();
    let created = fx.service.create_account(user.id, 0).await.unwrap();

    let guard = fx
        .locks
        .lock(&domain::account_lock_key(&created.account_number))
        .await
        .unwrap();

    let err = fx
        .service
        .delete_account(user.id, &created.account_number)
        .await
        .unwrap_err();
    assert!(err.is(ErrorCode::AccountTransactionLock));

    fx.locks.unlock(guard).await;

    let closed = fx
        .service
        .delete_account(user.id, &created.account_number)
        .await;
    assert!(closed.is_ok());
}

#[tokio::test]
async fn test_different_accounts_do_not_block_each_other() {
    let fx = fixture(impatient_locks());
    let user = fx.users.create("POBI".to_string()).await.unwrap();
    let first = fx.service.create_account(user.id, 0).await.unwrap();
    let second = fx.service.create_account(user.id, 0).await.unwrap();

    let _guard = fx
        .locks
        .lock(&domain::account_lock_key(&first.account_number))
        .await
        .unwrap();

    let closed = fx
        .service
        .delete_account(user.id, &second.account_number)
        .await;
    assert!(closed.is_ok());
}

#[tokio::test]
async fn test_lock_released_after_business_failure() {
    let fx = fixture(impatient_locks());
    let user = fx.users.create("POBI".to_string()).await.unwrap();
    let created = fx.service.create_account(user.id, 500).await.unwrap();

    let err = fx
        .service
        .delete_account(user.id, &created.account_number)
        .await
        .unwrap_err();
    assert!(err.is(ErrorCode::BalanceIsNotEmpty));

    // The lock from the failed attempt must be free again
    let guard = fx
        .locks
        .lock(&domain::account_lock_key(&created.account_number))
        .await;
    assert!(guard.is_ok());
}

#[tokio::test]
async fn test_dropped_guard_releases_lock() {
    let fx = fixture(impatient_locks());
    let key = domain::account_lock_key("1000000000");

    let guard = fx.locks.lock(&key).await.unwrap();
    drop(guard);

    // Release on drop runs on a spawned task
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(fx.locks.lock(&key).await.is_ok());
}
