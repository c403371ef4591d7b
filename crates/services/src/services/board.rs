//! Kanban board view-model and drop reconciliation.
//!
//! The board is derived from the task list at read time: four fixed status
//! columns, each holding an ordered task list. Drops mutate the in-memory
//! board first so callers see the move immediately, then the status change
//! is persisted; a failed write restores the pre-drop state.

use db::models::task::{Task, TaskStatus, TaskWithUsers};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;
use ts_rs::TS;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("board is out of date, reload and try again")]
    OutOfSync,
    #[error("task not found")]
    TaskNotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct KanbanColumn {
    pub status: TaskStatus,
    pub title: String,
    pub tasks: Vec<TaskWithUsers>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct KanbanBoard {
    pub columns: Vec<KanbanColumn>,
}

/// A slot on the board: which column, and where in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct DropPosition {
    pub status: TaskStatus,
    pub index: usize,
}

/// A completed drag gesture. `destination` is `None` when the item was
/// released outside any column.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DropRequest {
    pub task_id: i64,
    pub source: DropPosition,
    pub destination: Option<DropPosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum DropOutcome {
    NoOp,
    Reordered,
    Moved { from: TaskStatus, to: TaskStatus },
}

fn column_title(status: &TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "To Do",
        TaskStatus::InProgress => "In Progress",
        TaskStatus::Review => "Review",
        TaskStatus::Done => "Done",
    }
}

fn column_index(status: &TaskStatus) -> usize {
    match status {
        TaskStatus::Todo => 0,
        TaskStatus::InProgress => 1,
        TaskStatus::Review => 2,
        TaskStatus::Done => 3,
    }
}

impl KanbanBoard {
    /// Partition tasks into the four fixed columns, preserving input order
    /// within each column.
    pub fn from_tasks(tasks: Vec<TaskWithUsers>) -> Self {
        let mut columns: Vec<KanbanColumn> = TaskStatus::ALL
            .into_iter()
            .map(|status| KanbanColumn {
                title: column_title(&status).to_string(),
                status,
                tasks: Vec::new(),
            })
            .collect();

        for task in tasks {
            columns[column_index(&task.status)].tasks.push(task);
        }

        Self { columns }
    }

    pub fn column(&self, status: &TaskStatus) -> &KanbanColumn {
        &self.columns[column_index(status)]
    }

    /// Apply a drop gesture to the in-memory board.
    ///
    /// No destination, or a destination identical to the source, leaves the
    /// board untouched. A same-column drop reorders; a cross-column drop
    /// moves the task and rewrites its status field to match its new column.
    /// The task id must match what the board holds at the claimed source
    /// slot, otherwise the gesture was computed against stale state.
    pub fn apply_drop(&mut self, request: &DropRequest) -> Result<DropOutcome, BoardError> {
        let Some(destination) = &request.destination else {
            return Ok(DropOutcome::NoOp);
        };
        if *destination == request.source {
            return Ok(DropOutcome::NoOp);
        }

        let source_column = self.column(&request.source.status);
        let matches_slot = source_column
            .tasks
            .get(request.source.index)
            .is_some_and(|task| task.id == request.task_id);
        if !matches_slot {
            return Err(BoardError::OutOfSync);
        }

        let from_idx = column_index(&request.source.status);
        let to_idx = column_index(&destination.status);

        if from_idx == to_idx {
            let tasks = &mut self.columns[from_idx].tasks;
            let task = tasks.remove(request.source.index);
            let insert_at = destination.index.min(tasks.len());
            tasks.insert(insert_at, task);
            return Ok(DropOutcome::Reordered);
        }

        let mut task = self.columns[from_idx].tasks.remove(request.source.index);
        task.task.status = destination.status.clone();
        let tasks = &mut self.columns[to_idx].tasks;
        let insert_at = destination.index.min(tasks.len());
        tasks.insert(insert_at, task);

        Ok(DropOutcome::Moved {
            from: request.source.status.clone(),
            to: destination.status.clone(),
        })
    }
}

pub struct BoardService;

impl BoardService {
    /// Board snapshot from the current task list.
    pub async fn load(pool: &SqlitePool) -> Result<KanbanBoard, BoardError> {
        Ok(KanbanBoard::from_tasks(
            Task::find_all_with_users(pool).await?,
        ))
    }

    /// Apply a drop optimistically, then persist the status change for
    /// cross-column moves. If the write fails the board is rolled back to
    /// its pre-drop state and the error surfaces to the caller.
    pub async fn handle_drop(
        pool: &SqlitePool,
        board: &mut KanbanBoard,
        request: &DropRequest,
    ) -> Result<DropOutcome, BoardError> {
        let snapshot = board.clone();
        let outcome = board.apply_drop(request)?;

        if let DropOutcome::Moved { to, .. } = &outcome {
            match Task::update_status(pool, request.task_id, to.clone()).await {
                Ok(0) => {
                    *board = snapshot;
                    return Err(BoardError::TaskNotFound);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        task_id = request.task_id,
                        error = %e,
                        "status write failed, reverting board"
                    );
                    *board = snapshot;
                    return Err(e.into());
                }
            }
        }

        Ok(outcome)
    }
}
