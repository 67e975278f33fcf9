//! Repository port for append-only task comments.

use crate::task::domain::{TaskComment, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for comment repository operations.
pub type TaskCommentRepositoryResult<T> = Result<T, TaskCommentRepositoryError>;

/// Comment persistence contract.
///
/// Comments bypass the lifecycle engine entirely: no guard is taken and the
/// task's status is never consulted, only its existence.
#[async_trait]
pub trait TaskCommentRepository: Send + Sync {
    /// Appends a comment to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommentRepositoryError::TaskNotFound`] when the
    /// referenced task does not exist.
    async fn add(&self, comment: &TaskComment) -> TaskCommentRepositoryResult<()>;

    /// Returns all comments for a task in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommentRepositoryError::TaskNotFound`] when the task
    /// does not exist.
    async fn list_for_task(&self, task_id: TaskId)
    -> TaskCommentRepositoryResult<Vec<TaskComment>>;
}

/// Errors returned by comment repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskCommentRepositoryError {
    /// The referenced task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskCommentRepositoryError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
