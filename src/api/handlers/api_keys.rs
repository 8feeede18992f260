//! API key management handlers
//!
//! The create response is the only place the plaintext token ever appears;
//! list/update responses carry metadata and the display prefix only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::{error_response, require};
use crate::api::dto::ApiResponse;
use crate::application::ApiKeyService;
use crate::auth::middleware::AuthenticatedUser;
use crate::domain::{ApiKey, CreateApiKey, GeneratedApiKey, UpdateApiKey};

/// API key handler state
#[derive(Clone)]
pub struct ApiKeyHandlerState {
    pub service: ApiKeyService,
}

/// Create a new API key
///
/// The returned `token` is shown exactly once: it is not stored and
/// cannot be retrieved again.
#[utoipa::path(
    post,
    path = "/api/v1/api-keys",
    tag = "API Keys",
    security(("bearer_auth" = []), ("api_key" = [])),
    request_body = CreateApiKey,
    responses(
        (status = 201, description = "API key created", body = ApiResponse<GeneratedApiKey>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Json(request): Json<CreateApiKey>,
) -> Result<
    (StatusCode, Json<ApiResponse<GeneratedApiKey>>),
    (StatusCode, Json<ApiResponse<GeneratedApiKey>>),
> {
    require(principal.can_write(), "write")?;

    let generated = state
        .service
        .create_api_key(&principal.user_id, request)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(generated))))
}

/// List the caller's API keys, newest first
#[utoipa::path(
    get,
    path = "/api/v1/api-keys",
    tag = "API Keys",
    security(("bearer_auth" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "List of API keys", body = ApiResponse<Vec<ApiKey>>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_api_keys(
    State(state): State<ApiKeyHandlerState>,
    Extension(principal): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<ApiKey>>>, (StatusCode, Json<ApiResponse<Vec<ApiKey>>>)> {
    require(principal.can_read(), "read")?;

    let keys = state
        .service
        .get_user_api_keys(&principal.user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(keys)))
}

/// Update an API key's name, permissions or expiry
#[utoipa::path(
    patch,
    path = "/api/v1/api-keys/{id}",
    tag = "API Keys",
    security(("bearer_auth" = []), ("api_key" = [])),
    params(("id" = String, Path, description = "API key ID")),
    request_body = UpdateApiKey,
    responses(
        (status = 200, description = "API key updated", body = ApiResponse<ApiKey>),
        (status = 404, description = "API key not found")
    )
)]
pub async fn update_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateApiKey>,
) -> Result<Json<ApiResponse<ApiKey>>, (StatusCode, Json<ApiResponse<ApiKey>>)> {
    require(principal.can_write(), "write")?;

    let updated = state
        .service
        .update_api_key(&id, &principal.user_id, request)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(updated)))
}

/// Delete an API key permanently
#[utoipa::path(
    delete,
    path = "/api/v1/api-keys/{id}",
    tag = "API Keys",
    security(("bearer_auth" = []), ("api_key" = [])),
    params(("id" = String, Path, description = "API key ID")),
    responses(
        (status = 200, description = "API key deleted"),
        (status = 404, description = "API key not found")
    )
)]
pub async fn delete_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, Json<ApiResponse<()>>)> {
    require(principal.can_delete(), "delete")?;

    state
        .service
        .delete_api_key(&id, &principal.user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(())))
}

/// New active state after a toggle
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ToggleResponse {
    pub is_active: bool,
}

/// Flip an API key between active and inactive
#[utoipa::path(
    post,
    path = "/api/v1/api-keys/{id}/toggle",
    tag = "API Keys",
    security(("bearer_auth" = []), ("api_key" = [])),
    params(("id" = String, Path, description = "API key ID")),
    responses(
        (status = 200, description = "New key state", body = ApiResponse<ToggleResponse>),
        (status = 404, description = "API key not found")
    )
)]
pub async fn toggle_api_key(
    State(state): State<ApiKeyHandlerState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ToggleResponse>>, (StatusCode, Json<ApiResponse<ToggleResponse>>)> {
    require(principal.can_write(), "write")?;

    let is_active = state
        .service
        .toggle_api_key_status(&id, &principal.user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse::success(ToggleResponse { is_active })))
}
