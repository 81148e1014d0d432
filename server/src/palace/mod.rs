//! Palace
//!
//! Site settings, ruler profiles, the media gallery, history articles and
//! traditional titles, plus the home page aggregate.

pub mod gallery;
mod handlers;
pub mod history;
pub mod rulers;
pub mod settings;

use axum::routing::{get, post, put};
use axum::Router;

use crate::api::AppState;

pub use settings::{PalaceInfo, SiteSettings};

/// Public palace routes, nested under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/home", get(handlers::home))
        .route("/palace", get(handlers::get_palace_info))
        .route("/rulers", get(handlers::list_rulers))
        .route("/rulers/present", get(handlers::present_ruler))
        .route("/rulers/past", get(handlers::past_rulers))
        .route("/rulers/{id}", get(handlers::get_ruler))
        .route("/titles", get(handlers::list_titles))
        .route("/gallery", get(handlers::list_gallery))
        .route("/gallery/categories", get(handlers::list_gallery_categories))
        .route("/gallery/{id}", get(handlers::get_gallery_image))
        .route("/history", get(handlers::list_history))
        .route("/history/{slug}", get(handlers::get_history_article))
}

/// Content manager routes, nested under `/api/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/palace", put(handlers::update_palace_info))
        .route("/rulers", post(handlers::create_ruler))
        .route(
            "/rulers/{id}",
            put(handlers::update_ruler).delete(handlers::delete_ruler),
        )
        .route("/titles", post(handlers::create_title))
        .route(
            "/titles/{id}",
            put(handlers::update_title).delete(handlers::delete_title),
        )
        .route("/gallery", post(handlers::create_gallery_image))
        .route(
            "/gallery/{id}",
            put(handlers::update_gallery_image).delete(handlers::delete_gallery_image),
        )
        .route("/gallery/categories", post(handlers::create_gallery_category))
        .route(
            "/gallery/categories/{id}",
            put(handlers::update_gallery_category).delete(handlers::delete_gallery_category),
        )
        .route("/history", post(handlers::create_history_article))
        .route(
            "/history/{id}",
            put(handlers::update_history_article).delete(handlers::delete_history_article),
        )
}
