use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use services::services::{auth::AuthError, board::BoardError, task::TaskError};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

/// Unified rejection type for every handler. Each variant maps to a status
/// code and a user-facing message; store failures are logged here and
/// surfaced only as generic text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthError::MissingField(_)) => StatusCode::BAD_REQUEST,
            ApiError::Auth(AuthError::UserExists) => StatusCode::CONFLICT,
            ApiError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthError::Hash(_) | AuthError::Database(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Task(TaskError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Task(TaskError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Task(TaskError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Board(BoardError::OutOfSync) => StatusCode::CONFLICT,
            ApiError::Board(BoardError::TaskNotFound) => StatusCode::NOT_FOUND,
            ApiError::Board(BoardError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> String {
        match self {
            ApiError::Auth(AuthError::Hash(e)) => {
                error!(error = %e, "password hashing failure");
                "authentication failed".to_string()
            }
            ApiError::Auth(AuthError::Database(e)) => {
                error!(error = %e, "auth store failure");
                "authentication failed".to_string()
            }
            ApiError::Task(TaskError::Database(e)) => {
                error!(error = %e, "task store failure");
                "task operation failed".to_string()
            }
            ApiError::Board(BoardError::Database(e)) => {
                error!(error = %e, "board store failure");
                "board update failed".to_string()
            }
            ApiError::Database(e) => {
                error!(error = %e, "store failure");
                "request failed".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ApiResponse::<()>::error(self.user_message()));
        (status, body).into_response()
    }
}
