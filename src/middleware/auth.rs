use axum::{extract::FromRequestParts, http::request::Parts};
use axum_auth::AuthBasic;
use tracing::warn;

use crate::{error::AkkiError, state::AppState};

/// Header carrying the static API key on `/chat`
pub const API_KEY_HEADER: &str = "api-key";

/// Basic auth guard for the human facing routes
///
/// A missing or malformed `Authorization` header is treated like wrong
/// credentials, so the client always gets a challenge.
pub struct RequireBasicAuth;

impl FromRequestParts<AppState> for RequireBasicAuth {
    type Rejection = AkkiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (user, password) = match AuthBasic::from_request_parts(parts, state).await {
            Ok(AuthBasic((user, password))) => (user, password.unwrap_or_default()),
            Err(_) => (String::new(), String::new()),
        };
        state
            .gate
            .validate_basic_auth(&user, &password)
            .inspect_err(|_| warn!(path = %parts.uri.path(), "[AUTH] basic auth rejected"))?;
        Ok(Self)
    }
}

/// API key guard for `/chat`, applied as a route layer so it runs before the
/// body is read
pub struct RequireApiKey;

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = AkkiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts.headers.get(API_KEY_HEADER).map(|v| v.as_bytes());
        state
            .gate
            .validate_api_key(provided)
            .inspect_err(|_| warn!(path = %parts.uri.path(), "[AUTH] api key rejected"))?;
        Ok(Self)
    }
}
