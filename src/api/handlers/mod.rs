//! Request handlers for all resources

pub mod analytics;
pub mod api_keys;
pub mod auth;
pub mod events;
pub mod health;
pub mod landing;
pub mod metrics;

use axum::http::StatusCode;
use axum::Json;

use crate::api::dto::ApiResponse;
use crate::domain::DomainError;

/// Map a domain failure onto status + envelope. Unexpected internal
/// failures are logged and replaced with a generic message.
pub(crate) fn error_response<T>(err: DomainError) -> (StatusCode, Json<ApiResponse<T>>) {
    let status = match &err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Unauthorized(_) | DomainError::InvalidApiKey | DomainError::ApiKeyExpired => {
            StatusCode::UNAUTHORIZED
        }
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Database(_) | DomainError::Serialization(_) => {
            tracing::error!("internal error: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Internal server error")),
            );
        }
    };
    (status, Json(ApiResponse::error(err.to_string())))
}

/// Permission gate for API-key callers; session callers always pass.
pub(crate) fn require<T>(
    allowed: bool,
    permission: &str,
) -> Result<(), (StatusCode, Json<ApiResponse<T>>)> {
    if allowed {
        Ok(())
    } else {
        Err(error_response(DomainError::Forbidden(format!(
            "{permission} permission required"
        ))))
    }
}
