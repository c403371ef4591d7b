use axum::{
    Router,
    extract::{Json, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use serde::Serialize;
use services::services::board::{BoardService, DropOutcome, DropRequest, KanbanBoard};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError, guard::CurrentUser};

/// What a drop produced, plus the board as the server now sees it so the
/// client can reconcile.
#[derive(Debug, Serialize, TS)]
pub struct MoveResult {
    pub outcome: DropOutcome,
    pub board: KanbanBoard,
}

pub async fn get_board(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<KanbanBoard>>, ApiError> {
    let board = BoardService::load(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(board)))
}

pub async fn move_task(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(request): Json<DropRequest>,
) -> Result<ResponseJson<ApiResponse<MoveResult>>, ApiError> {
    let mut board = BoardService::load(&state.db.pool).await?;
    let outcome = BoardService::handle_drop(&state.db.pool, &mut board, &request).await?;
    Ok(ResponseJson(ApiResponse::success(MoveResult {
        outcome,
        board,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/board",
        Router::new()
            .route("/", get(get_board))
            .route("/move", post(move_task)),
    )
}
