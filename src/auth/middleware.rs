//! Authentication middleware for Axum
//!
//! Accepts either a dashboard session (`Authorization: Bearer <jwt>`) or a
//! Blink API token (`X-API-Key` header, or the raw token in `Authorization`,
//! sniffed by its prefix). API-token requests are verified against the key
//! store and recorded as `api_call` analytics events.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::jwt::{verify_token, JwtConfig};
use super::token::is_api_token_format;
use crate::application::{AnalyticsService, ApiKeyService};
use crate::domain::{
    ApiKeyPermissions, DomainError, EventPayload, RequestMeta, TrackEvent, VerifiedApiKey,
};

/// State threaded through the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    pub api_keys: ApiKeyService,
    pub analytics: AnalyticsService,
}

/// How the caller authenticated.
#[derive(Clone, Debug)]
pub enum AuthMethod {
    /// Dashboard JWT session
    Session,
    /// Programmatic API key
    ApiKey {
        key_id: String,
        permissions: ApiKeyPermissions,
    },
}

/// Authenticated principal inserted into request extensions.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: Option<String>,
    pub auth_method: AuthMethod,
}

impl AuthenticatedUser {
    fn from_api_key(verified: VerifiedApiKey) -> Self {
        Self {
            user_id: verified.user_id,
            username: None,
            auth_method: AuthMethod::ApiKey {
                key_id: verified.key_id,
                permissions: verified.permissions,
            },
        }
    }

    /// Session callers hold every permission; key callers hold their triple.
    pub fn permissions(&self) -> ApiKeyPermissions {
        match &self.auth_method {
            AuthMethod::Session => ApiKeyPermissions::default(),
            AuthMethod::ApiKey { permissions, .. } => *permissions,
        }
    }

    pub fn can_read(&self) -> bool {
        self.permissions().read
    }

    pub fn can_write(&self) -> bool {
        self.permissions().write
    }

    pub fn can_delete(&self) -> bool {
        self.permissions().delete
    }
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}

fn header_value<'a>(request: &'a Request<Body>, name: &str) -> Option<&'a str> {
    request.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Pull the API token out of the request, wherever the caller put it.
fn extract_api_token(request: &Request<Body>) -> Option<String> {
    if let Some(value) = header_value(request, "x-api-key") {
        if is_api_token_format(value) {
            return Some(value.to_string());
        }
    }
    let auth = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;
    let candidate = auth.strip_prefix("Bearer ").unwrap_or(auth);
    is_api_token_format(candidate).then(|| candidate.to_string())
}

/// Authentication middleware - requires a valid session or API token.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    // API token first: its prefix makes it unambiguous
    if let Some(token) = extract_api_token(&request) {
        let verified = match auth_state.api_keys.verify_api_key(&token).await {
            Ok(v) => v,
            Err(DomainError::ApiKeyExpired) => return unauthorized("API key has expired"),
            Err(DomainError::InvalidApiKey) => return unauthorized("Invalid API key"),
            Err(e) => {
                tracing::error!("API key verification failed: {}", e);
                return unauthorized("Invalid API key");
            }
        };

        record_api_call(&auth_state.analytics, &request, &verified);

        let user = AuthenticatedUser::from_api_key(verified);
        request.extensions_mut().insert(user);
        return next.run(request).await;
    }

    // Otherwise expect a Bearer JWT
    let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return unauthorized("Missing authentication token");
    };
    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return unauthorized("Invalid authentication token");
    };

    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => {
            if claims.is_expired() {
                return unauthorized("Token has expired");
            }
            let user = AuthenticatedUser {
                user_id: claims.sub,
                username: Some(claims.username),
                auth_method: AuthMethod::Session,
            };
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(_) => unauthorized("Invalid authentication token"),
    }
}

/// Record an `api_call` event for a key-authenticated request.
/// Fire-and-forget: authentication never waits on analytics.
fn record_api_call(
    analytics: &AnalyticsService,
    request: &Request<Body>,
    verified: &VerifiedApiKey,
) {
    let meta = RequestMeta {
        ip_address: header_value(request, "x-forwarded-for")
            .map(|v| v.split(',').next().unwrap_or(v).trim().to_string()),
        user_agent: header_value(request, "user-agent").map(str::to_string),
        api_key_id: Some(verified.key_id.clone()),
    };
    let event = TrackEvent::new(EventPayload::ApiCall {
        endpoint: Some(request.uri().path().to_string()),
    })
    .for_user(verified.user_id.clone())
    .with_meta(meta);

    let analytics = analytics.clone();
    tokio::spawn(async move {
        if let Err(e) = analytics.track_event(event).await {
            tracing::warn!("failed to record api_call event: {}", e);
        }
    });
}
