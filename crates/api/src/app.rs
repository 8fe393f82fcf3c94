use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_admin, trace_id};
use crate::routes::{activation, admin_bracelets, admin_matches, admin_reports, admin_users, health};
use crate::services::{HttpLlmClient, LlmClient};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub llm: Arc<dyn LlmClient>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);
    let llm: Arc<dyn LlmClient> = Arc::new(HttpLlmClient::new(config.llm.clone()));

    let state = AppState {
        pool,
        config: config.clone(),
        llm,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Public routes (visitor-facing, no authentication)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/bracelets/validate", get(activation::validate_bracelet))
        .route("/api/fortune", get(activation::fetch_fortune))
        .route("/api/register", post(activation::register));

    // Admin routes (static token, checked by middleware when configured)
    let admin_routes = Router::new()
        .route("/api/admin/users", get(admin_users::list_users))
        .route("/api/admin/users/:id", put(admin_users::update_user))
        .route("/api/admin/users/:id", delete(admin_users::delete_user))
        .route("/api/admin/bracelets", get(admin_bracelets::list_bracelets))
        .route("/api/admin/bracelets", post(admin_bracelets::seed_bracelets))
        .route(
            "/api/admin/bracelets/:uid",
            put(admin_bracelets::set_bracelet_status),
        )
        .route(
            "/api/admin/bracelets/:uid",
            delete(admin_bracelets::delete_bracelet),
        )
        .route("/api/admin/matches", get(admin_matches::list_matches))
        .route("/api/admin/stats", get(admin_reports::event_stats))
        .route("/api/admin/activities", get(admin_reports::recent_activities))
        .route("/api/admin/export", get(admin_reports::export))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
