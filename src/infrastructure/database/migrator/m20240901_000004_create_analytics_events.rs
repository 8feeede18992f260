//! Create blink_analytics_events table migration

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalyticsEvents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::UserId).string().null())
                    .col(ColumnDef::new(AnalyticsEvents::SecretId).string().null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::EventType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::EventData).text().null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::IpAddress)
                            .string_len(45)
                            .null(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::UserAgent).string().null())
                    .col(ColumnDef::new(AnalyticsEvents::ApiKeyId).string().null())
                    .col(
                        ColumnDef::new(AnalyticsEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Activity feeds and rollups scan by (user, time)
        manager
            .create_index(
                Index::create()
                    .name("idx_analytics_events_user_created")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::UserId)
                    .col(AnalyticsEvents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Top-secrets grouping scans by (secret, type)
        manager
            .create_index(
                Index::create()
                    .name("idx_analytics_events_secret_type")
                    .table(AnalyticsEvents::Table)
                    .col(AnalyticsEvents::SecretId)
                    .col(AnalyticsEvents::EventType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnalyticsEvents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum AnalyticsEvents {
    #[iden = "blink_analytics_events"]
    Table,
    Id,
    UserId,
    SecretId,
    EventType,
    EventData,
    IpAddress,
    UserAgent,
    ApiKeyId,
    CreatedAt,
}
