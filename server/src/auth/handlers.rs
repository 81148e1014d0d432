//! Authentication HTTP Handlers

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::{AuthError, AuthResult};
use super::jwt::generate_access_token;
use super::middleware::AuthUser;
use super::password::{hash_password, verify_password};
use crate::api::AppState;
use crate::db::{
    create_user, email_exists, find_user_by_email, find_user_by_id, update_user_profile, NewUser,
    ProfileUpdate, UserProfile,
};
use crate::permissions::Role;
use crate::util::deserialize_double_option;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Registration request. New accounts are always community members.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub phone_number: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub village: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub ward: String,
    /// Password (8-128 characters).
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authentication response with token.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token expiry in seconds.
    pub expires_in: i64,
    /// Token type (always "Bearer").
    pub token_type: &'static str,
    pub user: UserProfile,
}

/// Update profile request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    #[validate(length(max = 100))]
    pub traditional_title: Option<String>,
    #[validate(length(max = 100))]
    pub village: Option<String>,
    #[validate(length(max = 100))]
    pub ward: Option<String>,
    /// Image URL; `null` clears it.
    #[serde(default, deserialize_with = "deserialize_double_option")]
    #[allow(clippy::option_option)]
    pub profile_image: Option<Option<String>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a new community member.
///
/// POST /auth/register
#[tracing::instrument(skip(state, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AuthResult<Json<AuthResponse>> {
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    // Pre-check gives a clean error; the unique index still catches races
    if email_exists(&state.db, &body.email).await? {
        return Err(AuthError::EmailTaken);
    }

    let password_hash = hash_password(&body.password)?;

    let user = create_user(
        &state.db,
        &NewUser {
            email: &body.email,
            password_hash: &password_hash,
            first_name: &body.first_name,
            last_name: &body.last_name,
            phone_number: &body.phone_number,
            village: &body.village,
            ward: &body.ward,
            role: Role::Member,
            is_verified: false,
        },
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => AuthError::EmailTaken,
        other => AuthError::Database(other),
    })?;

    let token = generate_access_token(
        user.id,
        &state.config.jwt_secret,
        state.config.jwt_access_expiry,
    )?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(AuthResponse {
        access_token: token.token,
        expires_in: token.expires_in,
        token_type: "Bearer",
        user: user.into(),
    }))
}

/// Login with email/password.
///
/// POST /auth/login
#[tracing::instrument(skip(state, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AuthResult<Json<AuthResponse>> {
    let user = find_user_by_email(&state.db, &body.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    // Checked after the password so a wrong password never reveals inactive status
    if !user.is_active {
        return Err(AuthError::AccountInactive);
    }

    let token = generate_access_token(
        user.id,
        &state.config.jwt_secret,
        state.config.jwt_access_expiry,
    )?;

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(AuthResponse {
        access_token: token.token,
        expires_in: token.expires_in,
        token_type: "Bearer",
        user: user.into(),
    }))
}

/// Get current user profile.
///
/// GET /auth/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AuthResult<Json<UserProfile>> {
    let user = find_user_by_id(&state.db, auth_user.id)
        .await?
        .ok_or(AuthError::InvalidToken)?;
    Ok(Json(user.into()))
}

/// Update current user profile.
///
/// PATCH /auth/me
#[tracing::instrument(skip(state, body), fields(user_id = %auth_user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> AuthResult<Json<UserProfile>> {
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    let update = ProfileUpdate {
        first_name: body.first_name.as_deref(),
        last_name: body.last_name.as_deref(),
        phone_number: body.phone_number.as_deref(),
        bio: body.bio.as_deref(),
        traditional_title: body.traditional_title.as_deref(),
        village: body.village.as_deref(),
        ward: body.ward.as_deref(),
        profile_image: body.profile_image.as_ref().map(|v| v.as_deref()),
    };

    let user = update_user_profile(&state.db, auth_user.id, &update)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    tracing::info!("Profile updated");
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_body(password_confirm: &str) -> RegisterRequest {
        serde_json::from_value(serde_json::json!({
            "email": "member@example.com",
            "first_name": "Ojo",
            "last_name": "Attah",
            "password": "long-enough-password",
            "password_confirm": password_confirm,
        }))
        .unwrap()
    }

    #[test]
    fn test_register_request_valid() {
        assert!(register_body("long-enough-password").validate().is_ok());
    }

    #[test]
    fn test_register_request_password_mismatch() {
        let errors = register_body("different").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirm"));
    }

    #[test]
    fn test_register_request_rejects_bad_email() {
        let mut body = register_body("long-enough-password");
        body.email = "not-an-email".into();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_update_profile_has_no_role_field() {
        let body: UpdateProfileRequest =
            serde_json::from_str(r#"{"role": "ruler", "first_name": "Ada"}"#).unwrap();
        assert_eq!(body.first_name.as_deref(), Some("Ada"));
        assert!(body.profile_image.is_none());
    }
}
