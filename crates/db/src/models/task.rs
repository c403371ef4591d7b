use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use super::user::UserSummary;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// Board column order, also the closed set of recognized statuses.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    /// Everything except `done` counts as open.
    pub fn is_open(&self) -> bool {
        !matches!(self, TaskStatus::Done)
    }
}

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub creator_id: i64,
    pub assignee_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task joined with the display names of its creator and assignee. Names
/// only; emails and credentials stay out of task payloads.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
pub struct TaskWithUsers {
    #[sqlx(flatten)]
    #[serde(flatten)]
    #[ts(flatten)]
    pub task: Task,
    pub creator_name: String,
    pub assignee_name: Option<String>,
}

impl std::ops::Deref for TaskWithUsers {
    type Target = Task;
    fn deref(&self) -> &Self::Target {
        &self.task
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTask {
    pub name: String,
    pub description: String,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
    pub creator_id: i64,
    pub assignee_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateTask {
    pub name: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<i64>,
}

/// Aggregate team counters for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct TeamStats {
    pub total_members: i64,
    pub open_tasks: i64,
    pub tasks_completed: i64,
    pub top_performer: Option<UserSummary>,
}

const TASK_COLUMNS: &str =
    "id, name, description, priority, status, due_date, creator_id, assignee_id, created_at, updated_at";

const TASK_WITH_USERS_SELECT: &str = "SELECT
        t.id, t.name, t.description, t.priority, t.status, t.due_date,
        t.creator_id, t.assignee_id, t.created_at, t.updated_at,
        creator.name AS creator_name,
        assignee.name AS assignee_name
     FROM tasks t
     JOIN users creator ON creator.id = t.creator_id
     LEFT JOIN users assignee ON assignee.id = t.assignee_id";

impl Task {
    pub async fn create(pool: &SqlitePool, data: &CreateTask) -> Result<Self, sqlx::Error> {
        let status = data.status.clone().unwrap_or_default();
        let priority = data.priority.clone().unwrap_or_default();
        sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (name, description, priority, status, due_date, creator_id, assignee_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(&data.name)
        .bind(&data.description)
        .bind(priority)
        .bind(status)
        .bind(data.due_date)
        .bind(data.creator_id)
        .bind(data.assignee_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every task with creator/assignee names attached, newest first.
    pub async fn find_all_with_users(pool: &SqlitePool) -> Result<Vec<TaskWithUsers>, sqlx::Error> {
        sqlx::query_as::<_, TaskWithUsers>(&format!(
            "{TASK_WITH_USERS_SELECT} ORDER BY t.created_at DESC, t.id DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id_with_users(
        pool: &SqlitePool,
        id: i64,
    ) -> Result<Option<TaskWithUsers>, sqlx::Error> {
        sqlx::query_as::<_, TaskWithUsers>(&format!("{TASK_WITH_USERS_SELECT} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Full-field update. Returns `None` when the task does not exist.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET name = $2, description = $3, priority = $4, status = $5,
                 due_date = $6, assignee_id = $7, updated_at = CURRENT_TIMESTAMP
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.priority.clone())
        .bind(data.status.clone())
        .bind(data.due_date)
        .bind(data.assignee_id)
        .fetch_optional(pool)
        .await
    }

    /// Narrow single-field write used by the board path.
    pub async fn update_status(
        pool: &SqlitePool,
        id: i64,
        status: TaskStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks SET status = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
            .fetch_one(pool)
            .await
    }

    pub async fn count_open(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM tasks WHERE status IN ('todo', 'in_progress', 'review')",
        )
        .fetch_one(pool)
        .await
    }

    pub async fn count_done(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE status = 'done'")
            .fetch_one(pool)
            .await
    }

    /// Assignee with the most completed tasks. Ties go to the lowest user id
    /// so the result is deterministic.
    pub async fn top_performer(pool: &SqlitePool) -> Result<Option<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT u.id, u.name
             FROM tasks t
             JOIN users u ON u.id = t.assignee_id
             WHERE t.status = 'done'
             GROUP BY u.id, u.name
             ORDER BY COUNT(*) DESC, u.id ASC
             LIMIT 1",
        )
        .fetch_optional(pool)
        .await
    }
}
