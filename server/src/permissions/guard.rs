//! Capability guards for mutating routes.
//!
//! Anonymous callers get `Unauthenticated` (401); authenticated callers
//! without the capability get `Forbidden` (403).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::{AuthUser, Viewer};
use crate::error::{ApiError, ApiResult};

use super::Capability;

/// Check that `viewer` holds `capability`, returning the authenticated user.
pub fn require_capability(viewer: &Viewer, capability: Capability) -> ApiResult<&AuthUser> {
    let user = viewer.user().ok_or(ApiError::Unauthenticated)?;
    if user.role.has(capability) {
        Ok(user)
    } else {
        tracing::debug!(
            user_id = %user.id,
            role = %user.role,
            capability = ?capability,
            "Capability check failed"
        );
        Err(ApiError::Forbidden(capability))
    }
}

fn authorize(parts: &Parts, capability: Capability) -> ApiResult<AuthUser> {
    let viewer = parts
        .extensions
        .get::<Viewer>()
        .cloned()
        .unwrap_or_default();
    require_capability(&viewer, capability).cloned()
}

/// Extractor for routes that create, edit, publish or delete content.
#[derive(Debug, Clone)]
pub struct ContentManager(pub AuthUser);

/// Extractor for routes that triage community submissions.
#[derive(Debug, Clone)]
pub struct Moderator(pub AuthUser);

impl<S> FromRequestParts<S> for ContentManager
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authorize(parts, Capability::ManageContent).map(Self)
    }
}

impl<S> FromRequestParts<S> for Moderator
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authorize(parts, Capability::Moderate).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Role;
    use uuid::Uuid;

    fn user(role: Role) -> Viewer {
        Viewer::Authenticated(AuthUser {
            id: Uuid::new_v4(),
            email: "someone@example.com".into(),
            display_name: "Someone".into(),
            role,
        })
    }

    #[test]
    fn test_anonymous_is_unauthenticated() {
        let result = require_capability(&Viewer::Anonymous, Capability::Moderate);
        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn test_member_is_forbidden_from_moderation() {
        let viewer = user(Role::Member);
        let result = require_capability(&viewer, Capability::Moderate);
        assert!(matches!(
            result,
            Err(ApiError::Forbidden(Capability::Moderate))
        ));
    }

    #[test]
    fn test_chief_moderates_but_cannot_manage_content() {
        let viewer = user(Role::Chief);
        assert!(require_capability(&viewer, Capability::Moderate).is_ok());
        assert!(matches!(
            require_capability(&viewer, Capability::ManageContent),
            Err(ApiError::Forbidden(Capability::ManageContent))
        ));
    }
}
