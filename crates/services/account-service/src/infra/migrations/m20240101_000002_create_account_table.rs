//! Migration: Create account table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_account_user_table::AccountUser;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Account::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Account::AccountNumber)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Account::AccountUserId).big_integer().not_null())
                    .col(ColumnDef::new(Account::AccountStatus).string_len(16).not_null())
                    .col(ColumnDef::new(Account::Balance).big_integer().not_null())
                    .col(
                        ColumnDef::new(Account::RegisteredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Account::UnregisteredAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Account::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Account::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_account_user")
                            .from(Account::Table, Account::AccountUserId)
                            .to(AccountUser::Table, AccountUser::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Owner lookups and live-account counting
        manager
            .create_index(
                Index::create()
                    .name("idx_account_account_user_id")
                    .table(Account::Table)
                    .col(Account::AccountUserId)
                    .col(Account::AccountStatus)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_account_account_user_id")
                    .table(Account::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Account {
    Table,
    Id,
    AccountNumber,
    AccountUserId,
    AccountStatus,
    Balance,
    RegisteredAt,
    UnregisteredAt,
    CreatedAt,
    UpdatedAt,
}
