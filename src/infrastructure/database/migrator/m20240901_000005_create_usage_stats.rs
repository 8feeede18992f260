//! Create blink_usage_stats table migration

use sea_orm_migration::prelude::*;

use super::m20240901_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsageStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UsageStats::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UsageStats::UserId).string().not_null())
                    .col(ColumnDef::new(UsageStats::Date).date().not_null())
                    .col(
                        ColumnDef::new(UsageStats::SecretsCreated)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageStats::SecretsViewed)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageStats::SecretsDeleted)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageStats::FilesUploaded)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageStats::TotalStorageBytes)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UsageStats::ApiCalls)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usage_stats_user_id")
                            .from(UsageStats::Table, UsageStats::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The upsert-with-increment conflicts on (user_id, date)
        manager
            .create_index(
                Index::create()
                    .name("idx_usage_stats_user_date")
                    .table(UsageStats::Table)
                    .col(UsageStats::UserId)
                    .col(UsageStats::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsageStats::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum UsageStats {
    #[iden = "blink_usage_stats"]
    Table,
    Id,
    UserId,
    Date,
    SecretsCreated,
    SecretsViewed,
    SecretsDeleted,
    FilesUploaded,
    TotalStorageBytes,
    ApiCalls,
}
