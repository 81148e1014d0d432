//! Community Submissions
//!
//! Contact form, public feedback and newsletter sign-up. Submissions enter
//! the moderation workflow in their initial state.

mod handlers;
pub mod queries;

use axum::routing::{get, post};
use axum::Router;

use crate::api::AppState;

/// Community routes, nested under `/api`.
///
/// - POST /contact
/// - GET /feedback, POST /feedback
/// - POST /newsletter/subscribe, POST /newsletter/unsubscribe
/// - GET /admin/newsletter (content managers)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact", post(handlers::submit_contact))
        .route(
            "/feedback",
            get(handlers::list_feedback).post(handlers::submit_feedback),
        )
        .route("/newsletter/subscribe", post(handlers::subscribe))
        .route("/newsletter/unsubscribe", post(handlers::unsubscribe))
        .route("/admin/newsletter", get(handlers::list_subscribers))
}
