//! Create blink_secrets table migration

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
                    .table(Secrets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Secrets::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Secrets::UserId).string().null())
                    .col(ColumnDef::new(Secrets::Kind).string_len(10).not_null())
                    .col(ColumnDef::new(Secrets::SizeBytes).big_integer().null())
                    .col(
                        ColumnDef::new(Secrets::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Secrets::ViewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Secrets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_secrets_user_id")
                            .from(Secrets::Table, Secrets::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_secrets_user_id")
                    .table(Secrets::Table)
                    .col(Secrets::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Secrets::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Secrets {
    #[iden = "blink_secrets"]
    Table,
    Id,
    UserId,
    Kind,
    SizeBytes,
    ExpiresAt,
    ViewCount,
    CreatedAt,
}
