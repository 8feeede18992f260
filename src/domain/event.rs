//! Analytics event model
//!
//! Events are immutable lifecycle records. The payload is a tagged union
//! keyed by event kind, so a file-creation event cannot be recorded without
//! its byte size and a view event cannot smuggle one in.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle event kinds, stored as the `event_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Create,
    View,
    Delete,
    Expire,
    Renew,
    ApiCall,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::View => "view",
            Self::Delete => "delete",
            Self::Expire => "expire",
            Self::Renew => "renew",
            Self::ApiCall => "api_call",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "view" => Some(Self::View),
            "delete" => Some(Self::Delete),
            "expire" => Some(Self::Expire),
            "renew" => Some(Self::Renew),
            "api_call" => Some(Self::ApiCall),
            _ => None,
        }
    }
}

/// What kind of secret a creation event refers to. File creations carry
/// the uploaded size so storage counters can be maintained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecretCreated {
    Text,
    File { size_bytes: i64 },
}

/// Typed event payload, serialized to JSON into the `event_data` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventPayload {
    Create(SecretCreated),
    View,
    Delete,
    Expire,
    Renew,
    ApiCall {
        #[serde(skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
    },
}

impl EventPayload {
    /// The column tag for this payload.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Create(_) => EventType::Create,
            Self::View => EventType::View,
            Self::Delete => EventType::Delete,
            Self::Expire => EventType::Expire,
            Self::Renew => EventType::Renew,
            Self::ApiCall { .. } => EventType::ApiCall,
        }
    }
}

/// Optional request metadata recorded alongside an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub api_key_id: Option<String>,
}

/// Input for [`crate::application::AnalyticsService::track_event`].
#[derive(Debug, Clone)]
pub struct TrackEvent {
    pub user_id: Option<String>,
    pub secret_id: Option<String>,
    pub payload: EventPayload,
    pub meta: RequestMeta,
}

impl TrackEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            user_id: None,
            secret_id: None,
            payload,
            meta: RequestMeta::default(),
        }
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn for_secret(mut self, secret_id: impl Into<String>) -> Self {
        self.secret_id = Some(secret_id.into());
        self
    }

    pub fn with_meta(mut self, meta: RequestMeta) -> Self {
        self.meta = meta;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_create_payload_carries_size() {
        let payload = EventPayload::Create(SecretCreated::File { size_bytes: 2048 });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["event"], "create");
        assert_eq!(json["kind"], "file");
        assert_eq!(json["size_bytes"], 2048);
        assert_eq!(payload.event_type(), EventType::Create);
    }

    #[test]
    fn text_create_payload_has_no_size() {
        let payload = EventPayload::Create(SecretCreated::Text);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "text");
        assert!(json.get("size_bytes").is_none());
    }

    #[test]
    fn file_create_without_size_is_rejected() {
        let err = serde_json::from_str::<EventPayload>(r#"{"event":"create","kind":"file"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn event_type_tags_roundtrip() {
        for ty in [
            EventType::Create,
            EventType::View,
            EventType::Delete,
            EventType::Expire,
            EventType::Renew,
            EventType::ApiCall,
        ] {
            assert_eq!(EventType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(EventType::parse("unknown"), None);
    }
}
