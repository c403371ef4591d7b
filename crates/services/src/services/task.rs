//! Task CRUD and aggregate queries on top of the task store.

use chrono::NaiveDate;
use db::models::{
    task::{CreateTask, Task, TaskPriority, TaskStatus, TaskWithUsers, TeamStats, UpdateTask},
    user::User,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),
    #[error("task not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Fields accepted when creating a task; the creator comes from the
/// authenticated request, never from the payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<i64>,
}

/// Full-field update payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct TaskUpdate {
    pub name: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<i64>,
}

pub struct TaskService;

impl TaskService {
    pub async fn create(
        pool: &SqlitePool,
        creator_id: i64,
        data: NewTask,
    ) -> Result<TaskWithUsers, TaskError> {
        let name = validated_name(&data.name)?;
        validate_assignee(pool, data.assignee_id).await?;

        let task = Task::create(
            pool,
            &CreateTask {
                name,
                description: data.description,
                priority: data.priority,
                status: data.status,
                due_date: data.due_date,
                creator_id,
                assignee_id: data.assignee_id,
            },
        )
        .await?;

        info!(task_id = task.id, "task created");
        Task::find_by_id_with_users(pool, task.id)
            .await?
            .ok_or(TaskError::NotFound)
    }

    pub async fn update(
        pool: &SqlitePool,
        task_id: i64,
        data: TaskUpdate,
    ) -> Result<TaskWithUsers, TaskError> {
        let name = validated_name(&data.name)?;
        validate_assignee(pool, data.assignee_id).await?;

        let updated = Task::update(
            pool,
            task_id,
            &UpdateTask {
                name,
                description: data.description,
                priority: data.priority,
                status: data.status,
                due_date: data.due_date,
                assignee_id: data.assignee_id,
            },
        )
        .await?;

        match updated {
            Some(task) => Task::find_by_id_with_users(pool, task.id)
                .await?
                .ok_or(TaskError::NotFound),
            None => Err(TaskError::NotFound),
        }
    }

    /// Narrow status write used by the board path; unrelated fields are left
    /// untouched and unvalidated.
    pub async fn update_status(
        pool: &SqlitePool,
        task_id: i64,
        status: TaskStatus,
    ) -> Result<(), TaskError> {
        let affected = Task::update_status(pool, task_id, status).await?;
        if affected == 0 {
            return Err(TaskError::NotFound);
        }
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, task_id: i64) -> Result<(), TaskError> {
        let affected = Task::delete(pool, task_id).await?;
        if affected == 0 {
            return Err(TaskError::NotFound);
        }
        info!(task_id, "task deleted");
        Ok(())
    }

    pub async fn all_tasks(pool: &SqlitePool) -> Result<Vec<TaskWithUsers>, TaskError> {
        Ok(Task::find_all_with_users(pool).await?)
    }

    pub async fn team_stats(pool: &SqlitePool) -> Result<TeamStats, TaskError> {
        Ok(TeamStats {
            total_members: User::count(pool).await?,
            open_tasks: Task::count_open(pool).await?,
            tasks_completed: Task::count_done(pool).await?,
            top_performer: Task::top_performer(pool).await?,
        })
    }
}

fn validated_name(name: &str) -> Result<String, TaskError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TaskError::Validation("task name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

async fn validate_assignee(pool: &SqlitePool, assignee_id: Option<i64>) -> Result<(), TaskError> {
    if let Some(id) = assignee_id {
        if User::find_by_id(pool, id).await?.is_none() {
            return Err(TaskError::Validation("assignee does not exist".to_string()));
        }
    }
    Ok(())
}
