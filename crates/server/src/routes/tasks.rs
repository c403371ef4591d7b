use axum::{
    Router,
    extract::{Json, Path, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use db::models::task::{TaskPriority, TaskStatus, TaskWithUsers};
use serde::Deserialize;
use services::services::task::{NewTask, TaskService, TaskUpdate};
use ts_rs::TS;
use utils::{
    response::ApiResponse,
    serde_helpers::{empty_string_as_none, lenient_optional_id},
};

use crate::{AppState, error::ApiError, guard::CurrentUser};

/// Task form fields as the client submits them. `title` maps to the task
/// name; empty `dueDate`/`assigneeId` strings mean "none".
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskForm {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_optional_id")]
    pub assignee_id: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
pub struct StatusUpdate {
    pub status: TaskStatus,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<ResponseJson<ApiResponse<Vec<TaskWithUsers>>>, ApiError> {
    let tasks = TaskService::all_tasks(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<TaskForm>,
) -> Result<ResponseJson<ApiResponse<TaskWithUsers>>, ApiError> {
    let task = TaskService::create(
        &state.db.pool,
        user.id,
        NewTask {
            name: form.title,
            description: form.description.unwrap_or_default(),
            priority: form.priority,
            status: form.status,
            due_date: form.due_date,
            assignee_id: form.assignee_id,
        },
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success_with_message(
        task,
        "task created",
    )))
}

pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(task_id): Path<i64>,
    Json(form): Json<TaskForm>,
) -> Result<ResponseJson<ApiResponse<TaskWithUsers>>, ApiError> {
    let task = TaskService::update(
        &state.db.pool,
        task_id,
        TaskUpdate {
            name: form.title,
            description: form.description.unwrap_or_default(),
            priority: form.priority.unwrap_or_default(),
            status: form.status.unwrap_or_default(),
            due_date: form.due_date,
            assignee_id: form.assignee_id,
        },
    )
    .await?;

    Ok(ResponseJson(ApiResponse::success_with_message(
        task,
        "task updated",
    )))
}

/// Narrow status write, used by the board's drag path.
pub async fn update_task_status(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(task_id): Path<i64>,
    Json(payload): Json<StatusUpdate>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    TaskService::update_status(&state.db.pool, task_id, payload.status).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(task_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    TaskService::delete(&state.db.pool, task_id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "task deleted",
    )))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/tasks",
        Router::new()
            .route("/", get(list_tasks).post(create_task))
            .route("/{task_id}", put(update_task).delete(delete_task))
            .route("/{task_id}/status", post(update_task_status)),
    )
}
