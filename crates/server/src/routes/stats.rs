use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::task::TeamStats;
use services::services::task::TaskService;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, guard::CurrentUser};

pub async fn team_stats(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<TeamStats>>, ApiError> {
    let stats = TaskService::team_stats(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(stats)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/stats/team", get(team_stats))
}
