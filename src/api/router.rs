//! API router with Swagger UI

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::dto::ApiResponse;
use crate::application::{AnalyticsService, ApiKeyService};
use crate::auth::middleware::{auth_middleware, AuthState};
use crate::auth::JwtConfig;
use crate::domain;

use super::handlers::{analytics, api_keys, auth, events, health, landing, metrics};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Dashboard session token"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::register,
        auth::login,
        auth::get_current_user,
        // API Keys
        api_keys::create_api_key,
        api_keys::list_api_keys,
        api_keys::update_api_key,
        api_keys::delete_api_key,
        api_keys::toggle_api_key,
        // Analytics
        events::track_event,
        analytics::get_my_analytics,
        analytics::get_realtime_metrics,
        analytics::get_system_analytics,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            // Health
            health::HealthResponse,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::RegisterRequest,
            auth::UserInfo,
            // API Keys
            domain::ApiKey,
            domain::ApiKeyPermissions,
            domain::CreateApiKey,
            domain::UpdateApiKey,
            domain::GeneratedApiKey,
            api_keys::ToggleResponse,
            // Analytics
            events::TrackEventRequest,
            domain::EventPayload,
            domain::SecretCreated,
            domain::RecentEvent,
            domain::DailyUsage,
            domain::TopSecret,
            domain::UserAnalytics,
            domain::SystemAnalytics,
            domain::RealTimeMetrics,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Authentication", description = "Accounts and sessions"),
        (name = "API Keys", description = "Programmatic access credentials"),
        (name = "Analytics", description = "Event tracking and rollups"),
    )
)]
pub struct ApiDoc;

/// Build the complete application router.
pub fn create_api_router(
    db: DatabaseConnection,
    jwt_config: JwtConfig,
    prometheus_handle: PrometheusHandle,
) -> Router {
    let api_key_service = ApiKeyService::new(db.clone());
    let analytics_service = AnalyticsService::new(db.clone());

    let middleware_state = AuthState {
        jwt_config: jwt_config.clone(),
        api_keys: api_key_service.clone(),
        analytics: analytics_service.clone(),
    };

    let auth_state = auth::AuthHandlerState {
        db: db.clone(),
        jwt_config,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .with_state(auth_state.clone());

    // Auth routes (protected)
    let auth_protected_routes = Router::new()
        .route("/me", get(auth::get_current_user))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(auth_state);

    // API key routes (protected)
    let api_key_routes = Router::new()
        .route(
            "/",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route(
            "/{id}",
            axum::routing::patch(api_keys::update_api_key).delete(api_keys::delete_api_key),
        )
        .route("/{id}/toggle", post(api_keys::toggle_api_key))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(api_keys::ApiKeyHandlerState {
            service: api_key_service,
        });

    // Event tracking (protected)
    let event_routes = Router::new()
        .route("/", post(events::track_event))
        .layer(middleware::from_fn_with_state(
            middleware_state.clone(),
            auth_middleware,
        ))
        .with_state(events::EventHandlerState {
            service: analytics_service.clone(),
        });

    // Analytics rollups (protected)
    let analytics_routes = Router::new()
        .route("/me", get(analytics::get_my_analytics))
        .route("/realtime", get(analytics::get_realtime_metrics))
        .route("/system", get(analytics::get_system_analytics))
        .layer(middleware::from_fn_with_state(
            middleware_state,
            auth_middleware,
        ))
        .with_state(analytics::AnalyticsHandlerState {
            service: analytics_service,
        });

    // Prometheus scrape endpoint
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: prometheus_handle,
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // Build router
    Router::new()
        // Swagger UI
        .merge(swagger_routes)
        // Landing page
        .route("/", get(landing::landing_page))
        // Health
        .route("/api/v1/health", get(health::health_check))
        // Auth
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/auth", auth_protected_routes)
        // API Keys
        .nest("/api/v1/api-keys", api_key_routes)
        // Events
        .nest("/api/v1/events", event_routes)
        // Analytics
        .nest("/api/v1/analytics", analytics_routes)
        // Metrics
        .merge(metrics_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
