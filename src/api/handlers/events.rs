//! Event tracking handler

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use super::{error_response, require};
use crate::api::dto::ApiResponse;
use crate::application::AnalyticsService;
use crate::auth::middleware::{AuthMethod, AuthenticatedUser};
use crate::domain::{EventPayload, RecentEvent, RequestMeta, TrackEvent};

/// Event handler state
#[derive(Clone)]
pub struct EventHandlerState {
    pub service: AnalyticsService,
}

/// Track-event request
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "payload": { "event": "create", "kind": "file", "size_bytes": 4096 },
    "secret_id": "2f4c9a31-6f3e-4e94-a2cf-9f8b1c1d2e3f"
}))]
pub struct TrackEventRequest {
    pub payload: EventPayload,
    pub secret_id: Option<String>,
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
}

/// Record a lifecycle event for the authenticated user
///
/// The event row is immutable; daily usage counters are bumped as a side
/// effect and never fail the call.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Analytics",
    security(("bearer_auth" = []), ("api_key" = [])),
    request_body = TrackEventRequest,
    responses(
        (status = 201, description = "Event recorded", body = ApiResponse<RecentEvent>),
        (status = 403, description = "API key lacks write permission")
    )
)]
pub async fn track_event(
    State(state): State<EventHandlerState>,
    Extension(principal): Extension<AuthenticatedUser>,
    headers: HeaderMap,
    Json(request): Json<TrackEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RecentEvent>>), (StatusCode, Json<ApiResponse<RecentEvent>>)>
{
    require(principal.can_write(), "write")?;

    let api_key_id = match &principal.auth_method {
        AuthMethod::ApiKey { key_id, .. } => Some(key_id.clone()),
        AuthMethod::Session => None,
    };

    let mut event = TrackEvent::new(request.payload)
        .for_user(principal.user_id.clone())
        .with_meta(RequestMeta {
            ip_address: client_ip(&headers),
            user_agent: headers
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            api_key_id,
        });
    if let Some(secret_id) = request.secret_id {
        event = event.for_secret(secret_id);
    }

    let recorded = state
        .service
        .track_event(event)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(recorded))))
}
