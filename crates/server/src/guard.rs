//! Access-control checkpoint for protected routes.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use db::models::user::UserPublic;
use services::services::auth::AuthService;

use crate::{AppState, error::ApiError};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Extractor that resolves the authenticated user from the `session`
/// cookie, once per request. Handlers taking `CurrentUser` never run for
/// unauthenticated requests; this is the sole access-control checkpoint.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserPublic);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Err(ApiError::NotAuthenticated);
        };

        AuthService::current_user(&state.db.pool, cookie.value())
            .await?
            .map(CurrentUser)
            .ok_or(ApiError::NotAuthenticated)
    }
}
