//! JWT Token Generation and Validation
//!
//! HS256 access tokens signed with the shared `JWT_SECRET`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AuthError, AuthResult};

/// JWT claims for access tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID as UUID string).
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
}

/// Access token returned after successful authentication.
#[derive(Debug)]
pub struct AccessToken {
    pub token: String,
    /// Validity in seconds.
    pub expires_in: i64,
}

/// Generate an access token for `user_id`.
pub fn generate_access_token(
    user_id: Uuid,
    secret: &str,
    expiry_seconds: i64,
) -> AuthResult<AccessToken> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::seconds(expiry_seconds)).timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(AccessToken {
        token,
        expires_in: expiry_seconds,
    })
}

/// Validate and decode an access token.
pub fn validate_access_token(token: &str, secret: &str) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Parse the user id carried in `claims`.
pub fn subject(claims: &Claims) -> AuthResult<Uuid> {
    claims.sub.parse().map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_generate_and_validate() {
        let user_id = Uuid::now_v7();
        let token = generate_access_token(user_id, SECRET, 900).unwrap();
        assert_eq!(token.expires_in, 900);

        let claims = validate_access_token(&token.token, SECRET).unwrap();
        assert_eq!(subject(&claims).unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret_fails() {
        let token = generate_access_token(Uuid::now_v7(), SECRET, 900).unwrap();
        let result = validate_access_token(&token.token, "another-secret");
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_fails() {
        let token = generate_access_token(Uuid::now_v7(), SECRET, -60).unwrap();
        let result = validate_access_token(&token.token, SECRET);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_garbage_token_fails() {
        let result = validate_access_token("not.a.jwt", SECRET);
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }
}
