//! Moderation Workflow
//!
//! Triage of contact messages and approval of public feedback. Public
//! submission lives in `community`; this module owns the states, their
//! transitions and the staff routes that drive them.

pub mod contact;
pub mod feedback;
mod handlers;
pub mod queries;

use axum::routing::{get, post};
use axum::Router;

use crate::api::AppState;

pub use contact::{ArchiveState, ContactMessage, ContactMessageType, Triage, TriageState};
pub use feedback::{Feedback, FeedbackStatus, PublicFeedbackItem};

/// Staff moderation routes, nested under `/api/admin`.
///
/// Moderators (chief and above):
/// - GET /messages - Inbox with status, type and priority filters
/// - GET /messages/{id} - Open a message (marks it read)
/// - PATCH /messages/{id} - Edit priority and notes
/// - POST /messages/{id}/respond
/// - POST /messages/{id}/archive, /unarchive
///
/// Content managers:
/// - GET /feedback - Feedback queue
/// - POST /feedback/{id}/approve, /reject, /feature, /unfeature
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(handlers::list_messages))
        .route(
            "/messages/{id}",
            get(handlers::get_message).patch(handlers::update_message),
        )
        .route("/messages/{id}/respond", post(handlers::respond_to_message))
        .route("/messages/{id}/archive", post(handlers::archive_message))
        .route("/messages/{id}/unarchive", post(handlers::unarchive_message))
        .route("/feedback", get(handlers::list_feedback_queue))
        .route("/feedback/{id}/approve", post(handlers::approve_feedback))
        .route("/feedback/{id}/reject", post(handlers::reject_feedback))
        .route("/feedback/{id}/feature", post(handlers::feature_feedback))
        .route("/feedback/{id}/unfeature", post(handlers::unfeature_feedback))
}
