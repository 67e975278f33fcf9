//! Freeform comments attached to tasks.

use super::{CommentText, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A note attached to a task.
///
/// Comments are independent of lifecycle status: they can be added to a task
/// in any status, including `Deleted`, and are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskComment {
    /// Task the comment belongs to.
    pub task_id: TaskId,
    /// When the comment was written.
    pub commented_at: DateTime<Utc>,
    /// Author of the comment.
    pub commented_by: UserId,
    /// Comment body.
    pub comment: CommentText,
}

impl TaskComment {
    /// Creates a comment stamped with the current clock time.
    #[must_use]
    pub fn new(task_id: TaskId, commented_by: UserId, comment: CommentText, clock: &impl Clock) -> Self {
        Self {
            task_id,
            commented_at: clock.utc(),
            commented_by,
            comment,
        }
    }
}
