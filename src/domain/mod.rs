//! Core domain types shared across services

pub mod analytics;
pub mod api_key;
pub mod error;
pub mod event;

pub use analytics::{
    DailyUsage, RealTimeMetrics, RecentEvent, SystemAnalytics, TopSecret, UserAnalytics,
};
pub use api_key::{
    ApiKey, ApiKeyPermissions, CreateApiKey, GeneratedApiKey, UpdateApiKey, VerifiedApiKey,
};
pub use error::{DomainError, DomainResult};
pub use event::{EventPayload, EventType, RequestMeta, SecretCreated, TrackEvent};
