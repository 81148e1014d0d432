//! Announcements
//!
//! Palace announcements with categories, pinning and publish dates, and the
//! ruler's royal messages.

mod handlers;
pub mod queries;
pub mod types;

use axum::routing::{get, post, put};
use axum::Router;

use crate::api::AppState;

pub use types::{Announcement, AnnouncementCategory, RoyalMessage};

/// Public routes, nested under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/announcements", get(handlers::list_announcements))
        .route("/announcements/categories", get(handlers::list_categories))
        .route("/announcements/{slug}", get(handlers::get_announcement))
        .route("/royal-messages", get(handlers::list_royal_messages))
        .route("/royal-messages/{id}", get(handlers::get_royal_message))
}

/// Content manager routes, nested under `/api/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/announcements",
            get(handlers::manage_announcements).post(handlers::create_announcement),
        )
        .route(
            "/announcements/{id}",
            put(handlers::update_announcement).delete(handlers::delete_announcement),
        )
        .route("/announcements/categories", post(handlers::create_category))
        .route(
            "/announcements/categories/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route("/royal-messages", post(handlers::create_royal_message))
        .route(
            "/royal-messages/{id}",
            put(handlers::update_royal_message).delete(handlers::delete_royal_message),
        )
}
