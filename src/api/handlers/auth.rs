//! Authentication API handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::error_response;
use crate::api::dto::ApiResponse;
use crate::api::validation::ValidatedJson;
use crate::auth::middleware::AuthenticatedUser;
use crate::auth::{create_token, hash_password, verify_password, JwtConfig};
use crate::domain::DomainError;
use crate::infrastructure::database::entities::user;

/// Auth state for authentication handlers
#[derive(Clone)]
pub struct AuthHandlerState {
    pub db: sea_orm::DatabaseConnection,
    pub jwt_config: JwtConfig,
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({
    "username": "alice",
    "password": "hunter2hunter2"
}))]
pub struct LoginRequest {
    /// Username or email
    pub username: String,
    pub password: String,
}

/// Successful login response. The token goes into
/// `Authorization: Bearer <token>` on subsequent requests.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public user info
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl From<user::Model> for UserInfo {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "username": "alice",
    "email": "alice@example.com",
    "password": "hunter2hunter2"
}))]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserInfo>),
        (status = 409, description = "Username or email already taken"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), (StatusCode, Json<ApiResponse<UserInfo>>)> {
    let password_hash = hash_password(&request.password)
        .map_err(|e| error_response(DomainError::Validation(format!("password hash: {e}"))))?;

    let now = Utc::now();
    let new_user = user::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        username: Set(request.username),
        email: Set(request.email),
        password_hash: Set(password_hash),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        last_login_at: Set(None),
    };

    let created = new_user.insert(&state.db).await.map_err(|e| {
        if e.to_string().contains("UNIQUE") || e.to_string().contains("duplicate") {
            error_response(DomainError::Conflict(
                "Username or email already exists".to_string(),
            ))
        } else {
            error_response(DomainError::Database(e))
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserInfo::from(created))),
    ))
}

/// Log in with username or email
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated, returns a session token", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Bad credentials or disabled account")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, (StatusCode, Json<ApiResponse<LoginResponse>>)> {
    let user = user::Entity::find()
        .filter(
            user::Column::Username
                .eq(&request.username)
                .or(user::Column::Email.eq(&request.username)),
        )
        .one(&state.db)
        .await
        .map_err(|e| error_response(DomainError::Database(e)))?;

    let Some(user) = user else {
        return Err(error_response(DomainError::Unauthorized(
            "Invalid credentials".to_string(),
        )));
    };

    if !user.is_active {
        return Err(error_response(DomainError::Unauthorized(
            "Account is disabled".to_string(),
        )));
    }

    let password_valid = verify_password(&request.password, &user.password_hash).unwrap_or(false);
    if !password_valid {
        return Err(error_response(DomainError::Unauthorized(
            "Invalid credentials".to_string(),
        )));
    }

    let token = create_token(&user.id, &user.username, &state.jwt_config)
        .map_err(|e| error_response(DomainError::Validation(format!("token: {e}"))))?;

    // best effort; login success does not depend on it
    let mut active: user::ActiveModel = user.clone().into();
    active.last_login_at = Set(Some(Utc::now()));
    if let Err(e) = active.update(&state.db).await {
        tracing::warn!("failed to update last_login_at: {}", e);
    }

    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.expiration_hours * 3600,
        user: UserInfo::from(user),
    })))
}

/// Current account info
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserInfo>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    Extension(principal): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<UserInfo>>, (StatusCode, Json<ApiResponse<UserInfo>>)> {
    let user = user::Entity::find_by_id(&principal.user_id)
        .one(&state.db)
        .await
        .map_err(|e| error_response(DomainError::Database(e)))?
        .ok_or_else(|| {
            error_response(DomainError::NotFound {
                entity: "user",
                field: "id",
                value: principal.user_id.clone(),
            })
        })?;

    Ok(Json(ApiResponse::success(UserInfo::from(user))))
}
