pub mod auth;
pub mod board;
pub mod stats;
pub mod tasks;
pub mod users;

use axum::{Router, response::Json as ResponseJson, routing::get};
use utils::response::ApiResponse;

use crate::AppState;

async fn health() -> ResponseJson<ApiResponse<&'static str>> {
    ResponseJson(ApiResponse::success("ok"))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/api",
        Router::new()
            .merge(auth::router())
            .merge(board::router())
            .merge(stats::router())
            .merge(tasks::router())
            .merge(users::router())
            .route("/health", get(health)),
    )
}
