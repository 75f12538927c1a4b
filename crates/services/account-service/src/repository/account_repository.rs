//! Account repository implementation.
//!
//! Accounts are never physically deleted; closing an account is a status
//! update persisted through [`AccountRepository::save`].

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::entities::account::{self, ActiveModel, Entity as AccountEntity};
use super::entities::account_user::{self, Entity as AccountUserEntity};
use common::{AppError, AppResult};
use domain::{Account, AccountStatus, AccountUser};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find account by internal ID
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Account>>;

    /// Find account by its account number
    async fn find_by_account_number(&self, account_number: &str) -> AppResult<Option<Account>>;

    /// List every account owned by the user, closed ones included
    async fn find_all_by_account_user(&self, user: &AccountUser) -> AppResult<Vec<Account>>;

    /// Count the user's live (`IN_USE`) accounts
    async fn count_by_account_user(&self, user: &AccountUser) -> AppResult<u64>;

    /// Most recently created account (highest ID)
    async fn find_first_by_order_by_id_desc(&self) -> AppResult<Option<Account>>;

    /// Insert or update an account, returning the stored representation
    async fn save(&self, account: Account) -> AppResult<Account>;
}

/// Concrete implementation of AccountRepository
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Join result of an account and its owner
fn with_owner(
    (model, owner): (account::Model, Option<account_user::Model>),
) -> AppResult<Account> {
    let owner = owner.ok_or_else(|| {
        AppError::internal(format!("Account {} has no owner", model.account_number))
    })?;

    Ok(model.into_domain(AccountUser::from(owner))?)
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Account>> {
        let result = AccountEntity::find_by_id(id)
            .find_also_related(AccountUserEntity)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(with_owner).transpose()
    }

    async fn find_by_account_number(&self, account_number: &str) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(account::Column::AccountNumber.eq(account_number))
            .find_also_related(AccountUserEntity)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(with_owner).transpose()
    }

    async fn find_all_by_account_user(&self, user: &AccountUser) -> AppResult<Vec<Account>> {
        let models = AccountEntity::find()
            .filter(account::Column::AccountUserId.eq(user.id))
            .order_by_asc(account::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models
            .into_iter()
            .map(|model| model.into_domain(user.clone()).map_err(AppError::from))
            .collect()
    }

    async fn count_by_account_user(&self, user: &AccountUser) -> AppResult<u64> {
        let count = AccountEntity::find()
            .filter(account::Column::AccountUserId.eq(user.id))
            .filter(account::Column::AccountStatus.eq(AccountStatus::InUse.as_str()))
            .count(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(count)
    }

    async fn find_first_by_order_by_id_desc(&self) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .order_by_desc(account::Column::Id)
            .find_also_related(AccountUserEntity)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        result.map(with_owner).transpose()
    }

    async fn save(&self, account: Account) -> AppResult<Account> {
        let now = chrono::Utc::now();

        let model = match account.id {
            Some(id) => {
                let existing = AccountEntity::find_by_id(id)
                    .one(&self.db)
                    .await?
                    .ok_or_else(|| AppError::internal(format!("Account {} vanished", id)))?;

                let mut active: ActiveModel = existing.into();
                active.account_status = Set(account.account_status.to_string());
                active.balance = Set(account.balance);
                active.unregistered_at = Set(account.unregistered_at);
                active.updated_at = Set(now);

                active.update(&self.db).await.map_err(AppError::from)?
            }
            None => {
                let active = ActiveModel {
                    account_number: Set(account.account_number.clone()),
                    account_user_id: Set(account.account_user.id),
                    account_status: Set(account.account_status.to_string()),
                    balance: Set(account.balance),
                    registered_at: Set(account.registered_at),
                    unregistered_at: Set(account.unregistered_at),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };

                active.insert(&self.db).await.map_err(AppError::from)?
            }
        };

        Ok(model.into_domain(account.account_user)?)
    }
}
