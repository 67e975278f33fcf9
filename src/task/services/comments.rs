//! Service layer for the comment subsystem.
//!
//! Comments bypass the lifecycle engine: they attach to a task in any
//! status, including `Deleted`, and only require that the task exists.

use crate::task::{
    domain::{CommentText, TaskComment, TaskDomainError, TaskId, UserId},
    ports::{TaskCommentRepository, TaskCommentRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Caller-facing errors of the comment subsystem.
#[derive(Debug, Clone, Error)]
pub enum TaskCommentError {
    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The comment text was empty.
    #[error(transparent)]
    InvalidArgument(TaskDomainError),

    /// Unexpected store failure.
    #[error("internal storage error: {0}")]
    Internal(Arc<dyn std::error::Error + Send + Sync>),
}

impl From<TaskCommentRepositoryError> for TaskCommentError {
    fn from(err: TaskCommentRepositoryError) -> Self {
        match err {
            TaskCommentRepositoryError::TaskNotFound(id) => Self::NotFound(id),
            TaskCommentRepositoryError::Persistence(source) => Self::Internal(source),
        }
    }
}

/// Result type for comment service operations.
pub type TaskCommentResult<T> = Result<T, TaskCommentError>;

/// Comment orchestration service.
#[derive(Clone)]
pub struct TaskCommentService<T, C>
where
    T: TaskCommentRepository,
    C: Clock + Send + Sync,
{
    comments: Arc<T>,
    clock: Arc<C>,
}

impl<T, C> TaskCommentService<T, C>
where
    T: TaskCommentRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new comment service.
    #[must_use]
    pub const fn new(comments: Arc<T>, clock: Arc<C>) -> Self {
        Self { comments, clock }
    }

    /// Appends a comment to an existing task and returns it with its author
    /// and timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommentError::InvalidArgument`] when the text is empty
    /// and [`TaskCommentError::NotFound`] when the task does not exist.
    pub async fn add_comment(
        &self,
        task_id: TaskId,
        actor: UserId,
        text: impl Into<String> + Send,
    ) -> TaskCommentResult<TaskComment> {
        let body = CommentText::new(text).map_err(TaskCommentError::InvalidArgument)?;
        let comment = TaskComment::new(task_id, actor, body, &*self.clock);
        self.comments.add(&comment).await?;
        debug!(task_id = %task_id, "comment added");
        Ok(comment)
    }

    /// Returns all comments for a task in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommentError::NotFound`] when the task does not exist.
    pub async fn list_comments(&self, task_id: TaskId) -> TaskCommentResult<Vec<TaskComment>> {
        Ok(self.comments.list_for_task(task_id).await?)
    }
}
