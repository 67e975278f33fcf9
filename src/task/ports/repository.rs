//! Repository port for task persistence and serialized lifecycle transitions.

use crate::task::domain::{
    Task, TaskDomainError, TaskHistoryRecord, TaskId, TransitionCommand,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// A committed transition: the updated task plus the history record that was
/// appended with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// The task as persisted after the transition.
    pub task: Task,
    /// The history record appended in the same atomic unit.
    pub history: TaskHistoryRecord,
}

/// Task persistence contract.
///
/// Implementations own the per-task mutual exclusion required by
/// [`transition`](Self::transition): an exclusive guard on the target task is
/// acquired before the current status is read and released only when the
/// mutation and history append have committed. Transitions on different
/// tasks never block each other.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID
    /// already exists.
    async fn create(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist. Soft-deleted tasks are
    /// still found; `Deleted` is a status, not row removal.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns all tasks in creation order.
    async fn list(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Persists a non-lifecycle edit (title, description, priority,
    /// `updated_at`). Never touches status columns and never writes history.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn update_details(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Runs a status transition as one atomic unit.
    ///
    /// Acquires the exclusive per-task guard, reads the current row, applies
    /// the command through [`Task::apply`], and commits the mutated task
    /// together with the new history record. On any error the store is left
    /// exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist, [`TaskRepositoryError::Transition`] when the command is not
    /// legal from the current status, and
    /// [`TaskRepositoryError::LockTimeout`] when the guard could not be
    /// acquired within the configured bound.
    async fn transition(
        &self,
        id: TaskId,
        command: TransitionCommand,
    ) -> TaskRepositoryResult<TransitionOutcome>;

    /// Returns all history records for a task in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn list_history(&self, id: TaskId) -> TaskRepositoryResult<Vec<TaskHistoryRecord>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The transition was rejected by the state machine under the guard.
    #[error(transparent)]
    Transition(#[from] TaskDomainError),

    /// The per-task guard was not acquired within the lock-wait bound.
    #[error("lock-wait timeout on task {0}")]
    LockTimeout(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for TaskRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        // Unclassified Diesel errors become persistence errors. Semantic
        // variants (duplicate, not-found, lock timeout) carry identifiers the
        // raw database error does not include, so adapters map those
        // explicitly where the identifiers are in scope.
        Self::persistence(err)
    }
}
