//! Account database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{Account, AccountStatus, AccountUser, DomainResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "account")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub account_number: String,
    pub account_user_id: i64,
    /// `IN_USE` or `UNREGISTERED`
    pub account_status: String,
    pub balance: i64,
    pub registered_at: DateTimeUtc,
    pub unregistered_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account_user::Entity",
        from = "Column::AccountUserId",
        to = "super::account_user::Column::Id"
    )]
    AccountUser,
}

impl Related<super::account_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert database model to domain entity with its owner
    pub fn into_domain(self, owner: AccountUser) -> DomainResult<Account> {
        Ok(Account {
            id: Some(self.id),
            account_status: self.account_status.parse::<AccountStatus>()?,
            account_number: self.account_number,
            account_user: owner,
            balance: self.balance,
            registered_at: self.registered_at,
            unregistered_at: self.unregistered_at,
        })
    }
}
