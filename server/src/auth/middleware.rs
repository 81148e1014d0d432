//! Authentication Middleware
//!
//! [`attach_viewer`] runs on every route and resolves the caller into a
//! [`Viewer`]. Handlers take `Viewer` when the caller is optional and
//! [`AuthUser`] when a signed-in user is required.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::db::{find_user_by_id, User};
use crate::permissions::Role;

use super::error::AuthError;
use super::jwt::{subject, validate_access_token};

/// Authenticated user injected into request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            display_name: user.display_name(),
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

/// The caller of a request.
#[derive(Debug, Clone, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    Authenticated(AuthUser),
}

impl Viewer {
    #[must_use]
    pub const fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }
}

/// Resolve the Authorization header into a [`Viewer`].
///
/// - No header: anonymous viewer
/// - Valid Bearer token for an active user: authenticated viewer
/// - Anything else: 401
pub async fn attach_viewer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let viewer = match request.headers().get(AUTHORIZATION) {
        None => Viewer::Anonymous,
        Some(value) => {
            let token = value
                .to_str()
                .ok()
                .and_then(|h| h.strip_prefix("Bearer "))
                .ok_or(AuthError::InvalidAuthHeader)?;

            let claims = validate_access_token(token, &state.config.jwt_secret)?;
            let user_id = subject(&claims)?;

            let user = find_user_by_id(&state.db, user_id)
                .await?
                .ok_or(AuthError::InvalidToken)?;

            if !user.is_active {
                tracing::debug!(user_id = %user.id, "Token presented for deactivated account");
                return Err(AuthError::AccountInactive);
            }

            let auth_user = AuthUser::from(user);
            request.extensions_mut().insert(auth_user.clone());
            Viewer::Authenticated(auth_user)
        }
    };

    request.extensions_mut().insert(viewer);
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}

/// Extractor for handlers that require a signed-in user.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}
