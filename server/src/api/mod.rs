//! API Router and Application State
//!
//! Central routing configuration and shared state.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit, extract::State, http::HeaderValue,
    middleware::from_fn_with_state, routing::get, Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    accounts, announcements, auth, community, config::Config, events, moderation, palace,
    palace::SiteSettings,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Server configuration
    pub config: Arc<Config>,
    /// Cached palace settings row
    pub site: SiteSettings,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            site: SiteSettings::default(),
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match &config.cors_allowed_origins {
        Some(origins) => AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        ),
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let max_body_size = state.config.max_body_size;

    // Staff routes; each handler checks its own capability
    let admin_routes = Router::new()
        .merge(palace::admin_router())
        .merge(announcements::admin_router())
        .merge(events::admin_router())
        .merge(moderation::router())
        .merge(accounts::admin_router());

    let api_routes = Router::new()
        .merge(palace::router())
        .merge(announcements::router())
        .merge(events::router())
        .merge(community::router())
        .merge(accounts::router())
        .nest("/admin", admin_routes);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/auth", auth::router())
        .nest("/api", api_routes)
        // Every route sees the resolved viewer
        .layer(from_fn_with_state(state.clone(), auth::attach_viewer))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_body_size))
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Whether the database answered
    database: bool,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .is_ok();

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}
