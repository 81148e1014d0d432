//! Authentication Service
//!
//! Local email/password accounts with HS256 bearer tokens.

mod error;
mod handlers;
pub mod jwt;
mod middleware;
pub mod password;

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::AppState;

pub use error::{AuthError, AuthResult};
pub use middleware::{attach_viewer, AuthUser, Viewer};

/// Create authentication router.
///
/// Public routes:
/// - POST /register - Register a new community member
/// - POST /login - Login with email/password
///
/// Authenticated routes:
/// - GET /me - Get current user profile
/// - PATCH /me - Update profile
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route(
            "/me",
            get(handlers::get_profile).patch(handlers::update_profile),
        )
}
