//! Account user repository implementation.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use super::entities::account_user::{ActiveModel, Entity as AccountUserEntity};
use common::{AppError, AppResult};
use domain::AccountUser;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account user repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountUserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: i64) -> AppResult<Option<AccountUser>>;

    /// Register a new user
    async fn create(&self, name: String) -> AppResult<AccountUser>;
}

/// Concrete implementation of AccountUserRepository
pub struct AccountUserStore {
    db: DatabaseConnection,
}

impl AccountUserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountUserRepository for AccountUserStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<AccountUser>> {
        let result = AccountUserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(AccountUser::from))
    }

    async fn create(&self, name: String) -> AppResult<AccountUser> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        Ok(AccountUser::from(model))
    }
}
