//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240901_000001_create_users;
mod m20240901_000002_create_secrets;
mod m20240901_000003_create_api_keys;
mod m20240901_000004_create_analytics_events;
mod m20240901_000005_create_usage_stats;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240901_000001_create_users::Migration),
            Box::new(m20240901_000002_create_secrets::Migration),
            Box::new(m20240901_000003_create_api_keys::Migration),
            Box::new(m20240901_000004_create_analytics_events::Migration),
            Box::new(m20240901_000005_create_usage_stats::Migration),
        ]
    }
}
