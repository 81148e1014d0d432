//! Events
//!
//! The ceremonial calendar: categorised events with derived schedule state,
//! a calendar feed, and the kingdom's traditional festivals.

mod handlers;
pub mod queries;
pub mod types;

use axum::routing::{get, post, put};
use axum::Router;

use crate::api::AppState;

pub use types::{CalendarEntry, Event, EventView, Festival, FestivalView};

/// Public routes, nested under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(handlers::list_events))
        .route("/events/calendar", get(handlers::calendar))
        .route("/events/categories", get(handlers::list_categories))
        .route("/events/{slug}", get(handlers::get_event))
        .route("/festivals", get(handlers::list_festivals))
        .route("/festivals/{slug}", get(handlers::get_festival))
}

/// Content manager routes, nested under `/api/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(handlers::manage_events).post(handlers::create_event),
        )
        .route(
            "/events/{id}",
            put(handlers::update_event).delete(handlers::delete_event),
        )
        .route("/events/categories", post(handlers::create_category))
        .route(
            "/events/categories/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route("/festivals", post(handlers::create_festival))
        .route(
            "/festivals/{id}",
            put(handlers::update_festival).delete(handlers::delete_festival),
        )
}
