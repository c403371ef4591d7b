use axum::{
    Router,
    extract::{Json, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use db::models::user::UserPublic;
use serde::Deserialize;
use services::services::auth::AuthService;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, guard::{CurrentUser, SESSION_COOKIE}};

#[derive(Debug, Deserialize, TS)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize, TS)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// HTTP-only, host-wide, no explicit expiry; the session row carries the
/// server-side TTL.
fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/")
        .build()
}

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<(CookieJar, ResponseJson<ApiResponse<UserPublic>>), ApiError> {
    let session = AuthService::signup(
        &state.db.pool,
        &payload.email,
        &payload.password,
        &payload.name,
    )
    .await?;

    let jar = jar.add(session_cookie(session.token));
    Ok((jar, ResponseJson(ApiResponse::success(session.user))))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, ResponseJson<ApiResponse<UserPublic>>), ApiError> {
    let session = AuthService::login(&state.db.pool, &payload.email, &payload.password).await?;

    let jar = jar.add(session_cookie(session.token));
    Ok((jar, ResponseJson(ApiResponse::success(session.user))))
}

/// Deletes the session row if one exists and clears the cookie either way.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ResponseJson<ApiResponse<()>>), ApiError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        AuthService::logout(&state.db.pool, cookie.value()).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    Ok((jar, ResponseJson(ApiResponse::success(()))))
}

pub async fn me(
    CurrentUser(user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<UserPublic>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/auth",
        Router::new()
            .route("/signup", post(signup))
            .route("/login", post(login))
            .route("/logout", post(logout))
            .route("/me", get(me)),
    )
}
