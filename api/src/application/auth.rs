use axum::{
    RequestPartsExt,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use macrocoach_core::domain::user::ports::UserRepository;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::args::AuthArgs;

use super::http::server::{api_entities::api_error::ApiError, app_state::AppState};

/// Claims read from the bearer token. `sub` is the identity provider's user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaim {
    pub sub: Uuid,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// The caller behind a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub auth_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Error, Deserialize, Serialize, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token not found")]
    TokenNotFound,
    #[error("Invalid signature")]
    InvalidSignature,
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError::Unauthorized(error.to_string())
    }
}

pub async fn extract_token_from_bearer(parts: &mut Parts) -> Result<String, AuthError> {
    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AuthError::TokenNotFound)?;

    Ok(bearer.token().to_string())
}

/// Verifies an HS256 token against the configured secret.
pub fn decode_token(token: &str, config: &AuthArgs) -> Result<JwtClaim, AuthError> {
    if config.jwt_secret.is_empty() {
        error!("JWT_SECRET is not configured, rejecting token");
        return Err(AuthError::InvalidSignature);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    match &config.jwt_audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    decode::<JwtClaim>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => {
            warn!("Rejected bearer token: {}", e);
            AuthError::InvalidToken
        }
    })
}

/// Requires a valid bearer token and resolves it to an application user,
/// stored as an [`Identity`] request extension.
pub async fn auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = req.into_parts();

    let token = extract_token_from_bearer(&mut parts).await?;
    let claims = decode_token(&token, &state.args.auth)?;

    let user_id = state
        .user_repository
        .find_user_id_by_auth_id(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to resolve user for token: {}", e);
            ApiError::Unauthorized("Authentication failed".to_string())
        })?
        .ok_or_else(|| {
            ApiError::NotFound("User profile not found. Please contact support.".to_string())
        })?;

    parts.extensions.insert(Identity {
        auth_id: claims.sub,
        user_id,
    });

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Extractor for the identity set by [`auth`].
pub struct RequiredIdentity(pub Identity);

impl<S> FromRequestParts<S> for RequiredIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .map(RequiredIdentity)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;

    fn config(secret: &str) -> AuthArgs {
        AuthArgs {
            jwt_secret: secret.to_string(),
            jwt_audience: None,
        }
    }

    fn token(secret: &str, exp: i64) -> (Uuid, String) {
        let sub = Uuid::new_v4();
        let claims = JwtClaim { sub, exp, aud: None };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        (sub, token)
    }

    fn in_one_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_valid_token_yields_subject() {
        let (sub, token) = token("secret", in_one_hour());
        let claims = decode_token(&token, &config("secret")).unwrap();
        assert_eq!(claims.sub, sub);
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let (_, token) = token("other", in_one_hour());
        assert_eq!(
            decode_token(&token, &config("secret")).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn test_expired_token() {
        let (_, token) = token("secret", chrono::Utc::now().timestamp() - 3600);
        assert_eq!(
            decode_token(&token, &config("secret")).unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[test]
    fn test_unconfigured_secret_rejects_everything() {
        let (_, token) = token("", in_one_hour());
        assert!(decode_token(&token, &config("")).is_err());
    }

    #[test]
    fn test_garbage_is_invalid_token() {
        assert_eq!(
            decode_token("not.a.jwt", &config("secret")).unwrap_err(),
            AuthError::InvalidToken
        );
    }
}
