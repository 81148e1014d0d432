//! Accounts
//!
//! Role dashboards, the Council of Chiefs, and user management for
//! content managers. Sign-in and self-service profile edits live in
//! [`crate::auth`].

pub mod chiefs;
pub mod dashboard;
mod handlers;

use axum::routing::{get, patch, post, put};
use axum::Router;

use crate::api::AppState;

pub use chiefs::ChiefProfile;
pub use dashboard::{Dashboard, DashboardKind, SiteStats};

/// Public and signed-in routes, nested under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::dashboard))
        .route("/chiefs", get(handlers::list_chiefs))
        .route("/chiefs/{id}", get(handlers::get_chief))
}

/// Content manager routes, nested under `/api/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::site_stats))
        .route("/members", get(handlers::list_members))
        .route("/users", post(handlers::create_account))
        .route("/users/{id}/role", put(handlers::change_role))
        .route("/users/{id}/status", patch(handlers::set_status))
        .route("/chiefs", post(handlers::create_chief))
        .route(
            "/chiefs/{id}",
            put(handlers::update_chief).delete(handlers::delete_chief),
        )
}
