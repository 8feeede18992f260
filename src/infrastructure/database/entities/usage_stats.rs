//! Daily usage stats entity for database
//!
//! One row per (user, calendar day), maintained by an atomic
//! insert-or-increment upsert. The (user_id, date) pair is unique.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Usage stats model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blink_usage_stats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub secrets_created: i64,
    pub secrets_viewed: i64,
    pub secrets_deleted: i64,
    pub files_uploaded: i64,
    pub total_storage_bytes: i64,
    pub api_calls: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
