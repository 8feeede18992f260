//! Aggregated analytics views returned by the analytics service

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// One event as surfaced in activity feeds.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecentEvent {
    pub id: String,
    /// Event kind tag (`create`, `view`, ...).
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-user, per-day counter row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub secrets_created: i64,
    pub secrets_viewed: i64,
    pub secrets_deleted: i64,
    pub files_uploaded: i64,
    pub total_storage_bytes: i64,
    pub api_calls: i64,
}

/// A secret ranked by view count within the analytics window.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopSecret {
    pub secret_id: String,
    pub view_count: u64,
    pub last_viewed: DateTime<Utc>,
}

/// Per-user rollup for the dashboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserAnalytics {
    /// Secrets currently owned by the user (all time).
    pub total_secrets: u64,
    /// View events recorded for the user (all time).
    pub total_views: u64,
    /// API-call events recorded for the user (all time).
    pub total_api_calls: u64,
    /// Storage figure from the most recent daily-stats row.
    pub storage_used_bytes: i64,
    /// Last 50 events within the window, newest first.
    pub recent_activity: Vec<RecentEvent>,
    /// Daily counter rows within the window, ascending by date.
    pub daily_stats: Vec<DailyUsage>,
    /// Up to 10 secrets, descending by view count.
    pub top_secrets: Vec<TopSecret>,
}

/// System-wide rollup.
#[derive(Debug, Serialize, ToSchema)]
pub struct SystemAnalytics {
    pub total_users: u64,
    pub total_secrets: u64,
    pub total_views: u64,
    pub total_api_calls: u64,
    /// Daily counter rows across all users within the window, ascending.
    pub daily_stats: Vec<DailyUsage>,
}

/// Last-hour activity snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct RealTimeMetrics {
    /// Events from the last hour, newest first.
    pub recent_events: Vec<RecentEvent>,
    /// Event counts bucketed by UTC hour of day (24 buckets).
    pub hourly_activity: Vec<u64>,
    /// Most recent daily-stats row within the last 24 hours, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_stats: Option<DailyUsage>,
}
