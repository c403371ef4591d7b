use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::user::{User, UserSummary};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, guard::CurrentUser};

/// Id and name only, for assignee pickers.
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let users = User::find_all_summaries(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(users)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}
