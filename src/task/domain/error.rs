//! Error types for task domain validation and transitions.

use super::{TaskId, TaskStatus, TransitionKind};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the storage limit.
    #[error("task title must be at most {max} characters, got {length}")]
    TitleTooLong {
        /// Number of characters in the rejected title.
        length: usize,
        /// Maximum number of characters accepted.
        max: usize,
    },

    /// The comment text is empty after trimming.
    #[error("comment text must not be empty")]
    EmptyComment,

    /// An assignment was requested without a user to assign.
    #[error("user to assign is required")]
    MissingAssignee,

    /// The requested transition is not legal from the task's current status.
    #[error("cannot {transition} task {task_id}: current status is {status}")]
    InvalidTransition {
        /// Task the transition was attempted on.
        task_id: TaskId,
        /// Status the task held when the transition was attempted.
        status: TaskStatus,
        /// The transition that was attempted.
        transition: TransitionKind,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
