//! Request gate for session-protected routes.
//!
//! Handlers take [`CurrentUser`] as their first argument. Axum runs parts
//! extractors before the body extractor, so a request without a live session
//! is rejected before its body is read or the store is touched.
use crate::api::error::{ApiError, api_unauthorized};
use crate::app::AppState;
use crate::auth::SESSION_COOKIE;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;

pub const MISSING_CREDENTIALS: &str = "Missing credentials";

/// The user bound to the request's session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| api_unauthorized(MISSING_CREDENTIALS))?;
        let session = state
            .sessions
            .resolve(&token)
            .ok_or_else(|| api_unauthorized(MISSING_CREDENTIALS))?;
        tracing::Span::current().record("user", session.username.as_str());
        Ok(CurrentUser {
            username: session.username,
        })
    }
}
