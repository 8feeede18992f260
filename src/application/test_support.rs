//! Shared fixtures for service tests

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use crate::infrastructure::database::entities::{secret, user};
use crate::infrastructure::database::migrator::Migrator;

/// Fresh in-memory SQLite database with the full schema applied.
/// Capped at one connection so every query sees the same memory store.
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let db = Database::connect(opts)
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");
    db
}

pub async fn seed_user(db: &DatabaseConnection, id: &str) {
    let now = Utc::now();
    user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(format!("user-{id}")),
        email: Set(format!("{id}@example.com")),
        password_hash: Set("not-a-real-hash".to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        last_login_at: Set(None),
    }
    .insert(db)
    .await
    .expect("seed user");
}

pub async fn seed_secret(db: &DatabaseConnection, id: &str, user_id: &str) {
    secret::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set(Some(user_id.to_string())),
        kind: Set(secret::SecretKind::Text),
        size_bytes: Set(None),
        expires_at: Set(None),
        view_count: Set(0),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("seed secret");
}
