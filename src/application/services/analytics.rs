//! Analytics service
//!
//! Records lifecycle events and derives per-user and system-wide rollups.
//! Event rows are the source of truth; per-day counters are a denormalized
//! cache maintained by an atomic insert-or-increment upsert, so concurrent
//! events for the same user and day cannot lose increments.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Timelike, Utc};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::{
    DailyUsage, DomainResult, EventPayload, EventType, RealTimeMetrics, RecentEvent,
    SecretCreated, SystemAnalytics, TopSecret, TrackEvent, UserAnalytics,
};
use crate::infrastructure::database::entities::{analytics_event, secret, usage_stats, user};

/// How many events the activity feed returns.
const RECENT_ACTIVITY_LIMIT: u64 = 50;
/// How many secrets the top-viewed list returns.
const TOP_SECRETS_LIMIT: usize = 10;

#[derive(Clone)]
pub struct AnalyticsService {
    db: DatabaseConnection,
}

/// Per-day counter increments derived from one event.
#[derive(Debug, Default, PartialEq, Eq)]
struct CounterDeltas {
    secrets_created: i64,
    secrets_viewed: i64,
    secrets_deleted: i64,
    files_uploaded: i64,
    total_storage_bytes: i64,
    api_calls: i64,
}

impl CounterDeltas {
    fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

fn deltas_for(payload: &EventPayload) -> CounterDeltas {
    let mut deltas = CounterDeltas::default();
    match payload {
        EventPayload::Create(created) => {
            deltas.secrets_created = 1;
            if let SecretCreated::File { size_bytes } = created {
                deltas.files_uploaded = 1;
                deltas.total_storage_bytes = *size_bytes;
            }
        }
        EventPayload::View => deltas.secrets_viewed = 1,
        EventPayload::Delete => deltas.secrets_deleted = 1,
        EventPayload::ApiCall { .. } => deltas.api_calls = 1,
        EventPayload::Expire | EventPayload::Renew => {}
    }
    deltas
}

fn model_to_recent(model: analytics_event::Model) -> RecentEvent {
    RecentEvent {
        id: model.id,
        event_type: model.event_type,
        secret_id: model.secret_id,
        created_at: model.created_at,
    }
}

fn model_to_daily(model: usage_stats::Model) -> DailyUsage {
    DailyUsage {
        date: model.date,
        secrets_created: model.secrets_created,
        secrets_viewed: model.secrets_viewed,
        secrets_deleted: model.secrets_deleted,
        files_uploaded: model.files_uploaded,
        total_storage_bytes: model.total_storage_bytes,
        api_calls: model.api_calls,
    }
}

impl AnalyticsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record one immutable event. When a user is attached, the user's
    /// daily counters are bumped as a secondary effect; a counter failure
    /// is logged and swallowed; the inserted event is the contract.
    pub async fn track_event(&self, event: TrackEvent) -> DomainResult<RecentEvent> {
        let now = Utc::now();
        let event_type = event.payload.event_type();
        let event_data = serde_json::to_string(&event.payload)?;
        let id = Uuid::new_v4().to_string();

        let row = analytics_event::ActiveModel {
            id: Set(id.clone()),
            user_id: Set(event.user_id.clone()),
            secret_id: Set(event.secret_id.clone()),
            event_type: Set(event_type.as_str().to_string()),
            event_data: Set(Some(event_data)),
            ip_address: Set(event.meta.ip_address),
            user_agent: Set(event.meta.user_agent),
            api_key_id: Set(event.meta.api_key_id),
            created_at: Set(now),
        };
        row.insert(&self.db).await?;

        metrics::counter!("blink_events_tracked_total", "type" => event_type.as_str())
            .increment(1);

        if let Some(user_id) = &event.user_id {
            if let Err(e) = self.bump_daily_stats(user_id, &event.payload, now).await {
                tracing::warn!(user_id = %user_id, "daily stats update failed: {}", e);
            }
        }

        Ok(RecentEvent {
            id,
            event_type: event_type.as_str().to_string(),
            secret_id: event.secret_id,
            created_at: now,
        })
    }

    /// Atomic insert-or-increment for the (user, day) counter row. The
    /// first event of a day inserts the seed row; conflicts add the deltas
    /// server-side in the same statement.
    async fn bump_daily_stats(
        &self,
        user_id: &str,
        payload: &EventPayload,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let deltas = deltas_for(payload);
        if deltas.is_zero() {
            return Ok(());
        }

        let seed = usage_stats::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            date: Set(now.date_naive()),
            secrets_created: Set(deltas.secrets_created),
            secrets_viewed: Set(deltas.secrets_viewed),
            secrets_deleted: Set(deltas.secrets_deleted),
            files_uploaded: Set(deltas.files_uploaded),
            total_storage_bytes: Set(deltas.total_storage_bytes),
            api_calls: Set(deltas.api_calls),
        };

        usage_stats::Entity::insert(seed)
            .on_conflict(
                OnConflict::columns([usage_stats::Column::UserId, usage_stats::Column::Date])
                    .value(
                        usage_stats::Column::SecretsCreated,
                        Expr::col(usage_stats::Column::SecretsCreated)
                            .add(deltas.secrets_created),
                    )
                    .value(
                        usage_stats::Column::SecretsViewed,
                        Expr::col(usage_stats::Column::SecretsViewed).add(deltas.secrets_viewed),
                    )
                    .value(
                        usage_stats::Column::SecretsDeleted,
                        Expr::col(usage_stats::Column::SecretsDeleted)
                            .add(deltas.secrets_deleted),
                    )
                    .value(
                        usage_stats::Column::FilesUploaded,
                        Expr::col(usage_stats::Column::FilesUploaded).add(deltas.files_uploaded),
                    )
                    .value(
                        usage_stats::Column::TotalStorageBytes,
                        Expr::col(usage_stats::Column::TotalStorageBytes)
                            .add(deltas.total_storage_bytes),
                    )
                    .value(
                        usage_stats::Column::ApiCalls,
                        Expr::col(usage_stats::Column::ApiCalls).add(deltas.api_calls),
                    )
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    /// Per-user rollup over the given look-back window (days).
    pub async fn get_user_analytics(
        &self,
        user_id: &str,
        days: i64,
    ) -> DomainResult<UserAnalytics> {
        let window_start = Utc::now() - Duration::days(days);

        let total_secrets_q = secret::Entity::find()
            .filter(secret::Column::UserId.eq(user_id))
            .count(&self.db);
        let total_views_q = analytics_event::Entity::find()
            .filter(analytics_event::Column::UserId.eq(user_id))
            .filter(analytics_event::Column::EventType.eq(EventType::View.as_str()))
            .count(&self.db);
        let total_api_calls_q = analytics_event::Entity::find()
            .filter(analytics_event::Column::UserId.eq(user_id))
            .filter(analytics_event::Column::EventType.eq(EventType::ApiCall.as_str()))
            .count(&self.db);
        let latest_stats_q = usage_stats::Entity::find()
            .filter(usage_stats::Column::UserId.eq(user_id))
            .order_by_desc(usage_stats::Column::Date)
            .one(&self.db);
        let recent_q = analytics_event::Entity::find()
            .filter(analytics_event::Column::UserId.eq(user_id))
            .filter(analytics_event::Column::CreatedAt.gte(window_start))
            .order_by_desc(analytics_event::Column::CreatedAt)
            .limit(RECENT_ACTIVITY_LIMIT)
            .all(&self.db);
        let daily_q = usage_stats::Entity::find()
            .filter(usage_stats::Column::UserId.eq(user_id))
            .filter(usage_stats::Column::Date.gte(window_start.date_naive()))
            .order_by_asc(usage_stats::Column::Date)
            .all(&self.db);
        let view_events_q = analytics_event::Entity::find()
            .filter(analytics_event::Column::UserId.eq(user_id))
            .filter(analytics_event::Column::EventType.eq(EventType::View.as_str()))
            .filter(analytics_event::Column::CreatedAt.gte(window_start))
            .all(&self.db);

        let (total_secrets, total_views, total_api_calls, latest_stats, recent, daily, view_events) =
            tokio::try_join!(
                total_secrets_q,
                total_views_q,
                total_api_calls_q,
                latest_stats_q,
                recent_q,
                daily_q,
                view_events_q
            )?;

        Ok(UserAnalytics {
            total_secrets,
            total_views,
            total_api_calls,
            storage_used_bytes: latest_stats.map(|s| s.total_storage_bytes).unwrap_or(0),
            recent_activity: recent.into_iter().map(model_to_recent).collect(),
            daily_stats: daily.into_iter().map(model_to_daily).collect(),
            top_secrets: top_secrets(&view_events),
        })
    }

    /// System-wide rollup over the given look-back window (days).
    pub async fn get_system_analytics(&self, days: i64) -> DomainResult<SystemAnalytics> {
        let window_start = Utc::now() - Duration::days(days);

        let total_users_q = user::Entity::find().count(&self.db);
        let total_secrets_q = secret::Entity::find().count(&self.db);
        let total_views_q = analytics_event::Entity::find()
            .filter(analytics_event::Column::EventType.eq(EventType::View.as_str()))
            .count(&self.db);
        let total_api_calls_q = analytics_event::Entity::find()
            .filter(analytics_event::Column::EventType.eq(EventType::ApiCall.as_str()))
            .count(&self.db);
        let daily_q = usage_stats::Entity::find()
            .filter(usage_stats::Column::Date.gte(window_start.date_naive()))
            .order_by_asc(usage_stats::Column::Date)
            .all(&self.db);

        let (total_users, total_secrets, total_views, total_api_calls, daily) = tokio::try_join!(
            total_users_q,
            total_secrets_q,
            total_views_q,
            total_api_calls_q,
            daily_q
        )?;

        Ok(SystemAnalytics {
            total_users,
            total_secrets,
            total_views,
            total_api_calls,
            daily_stats: daily.into_iter().map(model_to_daily).collect(),
        })
    }

    /// Last-hour snapshot: recent events (newest first), an hour-of-day
    /// histogram of those events, and the freshest daily row within 24h.
    pub async fn get_real_time_metrics(&self, user_id: &str) -> DomainResult<RealTimeMetrics> {
        let now = Utc::now();
        let one_hour_ago = now - Duration::hours(1);

        let events = analytics_event::Entity::find()
            .filter(analytics_event::Column::UserId.eq(user_id))
            .filter(analytics_event::Column::CreatedAt.gte(one_hour_ago))
            .order_by_desc(analytics_event::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut hourly_activity = vec![0u64; 24];
        for event in &events {
            hourly_activity[event.created_at.hour() as usize] += 1;
        }

        let latest_stats = usage_stats::Entity::find()
            .filter(usage_stats::Column::UserId.eq(user_id))
            .filter(usage_stats::Column::Date.gte((now - Duration::hours(24)).date_naive()))
            .order_by_desc(usage_stats::Column::Date)
            .one(&self.db)
            .await?;

        Ok(RealTimeMetrics {
            recent_events: events.into_iter().map(model_to_recent).collect(),
            hourly_activity,
            latest_stats: latest_stats.map(model_to_daily),
        })
    }
}

/// Group view events by secret, count them, track the latest timestamp,
/// rank by count descending and cap the list.
fn top_secrets(view_events: &[analytics_event::Model]) -> Vec<TopSecret> {
    let mut grouped: HashMap<&str, (u64, DateTime<Utc>)> = HashMap::new();
    for event in view_events {
        let Some(secret_id) = event.secret_id.as_deref() else {
            continue;
        };
        let entry = grouped.entry(secret_id).or_insert((0, event.created_at));
        entry.0 += 1;
        if event.created_at > entry.1 {
            entry.1 = event.created_at;
        }
    }

    let mut ranked: Vec<TopSecret> = grouped
        .into_iter()
        .map(|(secret_id, (view_count, last_viewed))| TopSecret {
            secret_id: secret_id.to_string(),
            view_count,
            last_viewed,
        })
        .collect();
    ranked.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    ranked.truncate(TOP_SECRETS_LIMIT);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{seed_secret, seed_user, setup_db};
    use crate::domain::RequestMeta;

    async fn service() -> (AnalyticsService, DatabaseConnection) {
        let db = setup_db().await;
        seed_user(&db, "u1").await;
        (AnalyticsService::new(db.clone()), db)
    }

    async fn insert_view(
        db: &DatabaseConnection,
        user_id: &str,
        secret_id: &str,
        at: DateTime<Utc>,
    ) {
        analytics_event::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(Some(user_id.to_string())),
            secret_id: Set(Some(secret_id.to_string())),
            event_type: Set("view".to_string()),
            event_data: Set(Some(r#"{"event":"view"}"#.to_string())),
            ip_address: Set(None),
            user_agent: Set(None),
            api_key_id: Set(None),
            created_at: Set(at),
        }
        .insert(db)
        .await
        .expect("insert view event");
    }

    async fn usage_row(db: &DatabaseConnection, user_id: &str) -> usage_stats::Model {
        usage_stats::Entity::find()
            .filter(usage_stats::Column::UserId.eq(user_id))
            .one(db)
            .await
            .unwrap()
            .expect("usage row exists")
    }

    #[tokio::test]
    async fn file_create_bumps_upload_and_storage_counters() {
        let (svc, db) = service().await;

        svc.track_event(
            TrackEvent::new(EventPayload::Create(SecretCreated::File { size_bytes: 2048 }))
                .for_user("u1"),
        )
        .await
        .unwrap();

        let row = usage_row(&db, "u1").await;
        assert_eq!(row.secrets_created, 1);
        assert_eq!(row.files_uploaded, 1);
        assert_eq!(row.total_storage_bytes, 2048);
        assert_eq!(row.secrets_viewed, 0);
    }

    #[tokio::test]
    async fn same_day_events_accumulate_additively() {
        let (svc, db) = service().await;

        svc.track_event(TrackEvent::new(EventPayload::Create(SecretCreated::Text)).for_user("u1"))
            .await
            .unwrap();
        svc.track_event(
            TrackEvent::new(EventPayload::Create(SecretCreated::File { size_bytes: 100 }))
                .for_user("u1"),
        )
        .await
        .unwrap();
        svc.track_event(TrackEvent::new(EventPayload::View).for_user("u1"))
            .await
            .unwrap();

        let row = usage_row(&db, "u1").await;
        assert_eq!(row.secrets_created, 2);
        assert_eq!(row.files_uploaded, 1);
        assert_eq!(row.total_storage_bytes, 100);
        assert_eq!(row.secrets_viewed, 1);

        // one row per (user, day), not one per event
        let rows = usage_stats::Entity::find().all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn anonymous_events_skip_daily_counters() {
        let (svc, db) = service().await;

        svc.track_event(TrackEvent::new(EventPayload::View))
            .await
            .unwrap();

        let stats = usage_stats::Entity::find().all(&db).await.unwrap();
        assert!(stats.is_empty());
        let events = analytics_event::Entity::find().all(&db).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn expire_and_renew_touch_no_counters() {
        let (svc, db) = service().await;

        svc.track_event(TrackEvent::new(EventPayload::Expire).for_user("u1"))
            .await
            .unwrap();
        svc.track_event(TrackEvent::new(EventPayload::Renew).for_user("u1"))
            .await
            .unwrap();

        assert!(usage_stats::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn event_rows_carry_request_metadata() {
        let (svc, db) = service().await;

        svc.track_event(
            TrackEvent::new(EventPayload::ApiCall {
                endpoint: Some("/api/v1/analytics/me".to_string()),
            })
            .for_user("u1")
            .with_meta(RequestMeta {
                ip_address: Some("203.0.113.9".to_string()),
                user_agent: Some("curl/8".to_string()),
                api_key_id: Some("key-1".to_string()),
            }),
        )
        .await
        .unwrap();

        let event = analytics_event::Entity::find()
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.event_type, "api_call");
        assert_eq!(event.ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(event.api_key_id.as_deref(), Some("key-1"));
        assert_eq!(usage_row(&db, "u1").await.api_calls, 1);
    }

    #[tokio::test]
    async fn top_secrets_ranked_by_views_with_latest_timestamp() {
        let (svc, db) = service().await;
        seed_secret(&db, "s1", "u1").await;
        seed_secret(&db, "s2", "u1").await;

        let base = Utc::now() - Duration::minutes(50);
        insert_view(&db, "u1", "s1", base).await;
        insert_view(&db, "u1", "s1", base + Duration::minutes(15)).await;
        insert_view(&db, "u1", "s1", base + Duration::minutes(40)).await;
        insert_view(&db, "u1", "s2", base + Duration::minutes(5)).await;

        let analytics = svc.get_user_analytics("u1", 30).await.unwrap();

        assert_eq!(analytics.top_secrets.len(), 2);
        let top = &analytics.top_secrets[0];
        assert_eq!(top.secret_id, "s1");
        assert_eq!(top.view_count, 3);
        assert_eq!(top.last_viewed, base + Duration::minutes(40));
        assert_eq!(analytics.top_secrets[1].secret_id, "s2");
        assert_eq!(analytics.total_secrets, 2);
        assert_eq!(analytics.total_views, 4);
    }

    #[tokio::test]
    async fn recent_activity_is_newest_first() {
        let (svc, _db) = service().await;

        for _ in 0..3 {
            svc.track_event(TrackEvent::new(EventPayload::View).for_user("u1"))
                .await
                .unwrap();
        }

        let analytics = svc.get_user_analytics("u1", 30).await.unwrap();
        let activity = &analytics.recent_activity;
        assert_eq!(activity.len(), 3);
        assert!(activity[0].created_at >= activity[1].created_at);
        assert!(activity[1].created_at >= activity[2].created_at);
    }

    #[tokio::test]
    async fn realtime_histogram_counts_last_hour_events() {
        let (svc, db) = service().await;
        seed_secret(&db, "s1", "u1").await;

        let now = Utc::now();
        insert_view(&db, "u1", "s1", now - Duration::minutes(2)).await;
        insert_view(&db, "u1", "s1", now - Duration::minutes(10)).await;
        insert_view(&db, "u1", "s1", now - Duration::minutes(20)).await;
        // outside the window, must not appear
        insert_view(&db, "u1", "s1", now - Duration::hours(2)).await;

        let metrics = svc.get_real_time_metrics("u1").await.unwrap();

        assert_eq!(metrics.recent_events.len(), 3);
        assert!(metrics.recent_events[0].created_at >= metrics.recent_events[1].created_at);
        let total: u64 = metrics.hourly_activity.iter().sum();
        assert_eq!(total, 3);
        assert_eq!(metrics.hourly_activity.len(), 24);
    }

    #[tokio::test]
    async fn realtime_includes_latest_daily_stats() {
        let (svc, _db) = service().await;

        svc.track_event(TrackEvent::new(EventPayload::View).for_user("u1"))
            .await
            .unwrap();

        let metrics = svc.get_real_time_metrics("u1").await.unwrap();
        let stats = metrics.latest_stats.expect("today's row is within 24h");
        assert_eq!(stats.secrets_viewed, 1);
    }

    #[tokio::test]
    async fn system_analytics_covers_all_users() {
        let (svc, db) = service().await;
        seed_user(&db, "u2").await;
        seed_secret(&db, "s1", "u1").await;

        svc.track_event(TrackEvent::new(EventPayload::View).for_user("u1"))
            .await
            .unwrap();
        svc.track_event(TrackEvent::new(EventPayload::View).for_user("u2"))
            .await
            .unwrap();

        let analytics = svc.get_system_analytics(30).await.unwrap();
        assert_eq!(analytics.total_users, 2);
        assert_eq!(analytics.total_secrets, 1);
        assert_eq!(analytics.total_views, 2);
        // one daily row per user
        assert_eq!(analytics.daily_stats.len(), 2);
    }
}
