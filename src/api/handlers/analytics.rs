//! Analytics API handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::{error_response, require};
use crate::api::dto::ApiResponse;
use crate::application::AnalyticsService;
use crate::auth::middleware::{AuthMethod, AuthenticatedUser};
use crate::domain::{DomainError, RealTimeMetrics, SystemAnalytics, UserAnalytics};

/// Analytics handler state
#[derive(Clone)]
pub struct AnalyticsHandlerState {
    pub service: AnalyticsService,
}

/// Look-back window parameter
#[derive(Debug, serde::Deserialize)]
pub struct WindowParams {
    /// Number of days to look back (default 30).
    pub days: Option<i64>,
}

/// Per-user analytics rollup
#[utoipa::path(
    get,
    path = "/api/v1/analytics/me",
    tag = "Analytics",
    params(("days" = Option<i64>, Query, description = "Look-back window in days (default 30)")),
    security(("bearer_auth" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "User analytics", body = ApiResponse<UserAnalytics>)
    )
)]
pub async fn get_my_analytics(
    State(state): State<AnalyticsHandlerState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Query(params): Query<WindowParams>,
) -> Result<Json<ApiResponse<UserAnalytics>>, (StatusCode, Json<ApiResponse<UserAnalytics>>)> {
    require(principal.can_read(), "read")?;

    let days = params.days.unwrap_or(30).clamp(1, 365);
    let analytics = state
        .service
        .get_user_analytics(&principal.user_id, days)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(analytics)))
}

/// Last-hour activity snapshot for the caller
#[utoipa::path(
    get,
    path = "/api/v1/analytics/realtime",
    tag = "Analytics",
    security(("bearer_auth" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Real-time metrics", body = ApiResponse<RealTimeMetrics>)
    )
)]
pub async fn get_realtime_metrics(
    State(state): State<AnalyticsHandlerState>,
    Extension(principal): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<RealTimeMetrics>>, (StatusCode, Json<ApiResponse<RealTimeMetrics>>)> {
    require(principal.can_read(), "read")?;

    let metrics = state
        .service
        .get_real_time_metrics(&principal.user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(metrics)))
}

/// System-wide analytics rollup
///
/// Dashboard sessions only; API keys are user-scoped credentials and do
/// not grant global visibility.
#[utoipa::path(
    get,
    path = "/api/v1/analytics/system",
    tag = "Analytics",
    params(("days" = Option<i64>, Query, description = "Look-back window in days (default 30)")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "System analytics", body = ApiResponse<SystemAnalytics>),
        (status = 403, description = "API-key callers are not allowed")
    )
)]
pub async fn get_system_analytics(
    State(state): State<AnalyticsHandlerState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Query(params): Query<WindowParams>,
) -> Result<Json<ApiResponse<SystemAnalytics>>, (StatusCode, Json<ApiResponse<SystemAnalytics>>)> {
    if !matches!(principal.auth_method, AuthMethod::Session) {
        return Err(error_response(DomainError::Forbidden(
            "system analytics requires a dashboard session".to_string(),
        )));
    }

    let days = params.days.unwrap_or(30).clamp(1, 365);
    let analytics = state
        .service
        .get_system_analytics(days)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(analytics)))
}
