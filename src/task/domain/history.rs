//! Immutable audit records for task status transitions.

use super::{TaskId, TaskStatus, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in a task's status history.
///
/// Exactly one record exists per successful transition. Records are created
/// by [`Task::apply`](super::Task::apply) in the same atomic unit as the task
/// mutation and are never updated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHistoryRecord {
    /// Task the transition was applied to.
    pub task_id: TaskId,
    /// When the transition happened.
    pub changed_at: DateTime<Utc>,
    /// Actor who performed the transition.
    pub changed_by: UserId,
    /// Status the task held immediately before the transition.
    pub previous_status: TaskStatus,
    /// Status the task holds immediately after the transition.
    pub new_status: TaskStatus,
    /// Assignee, populated only for assignment transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
}

impl TaskHistoryRecord {
    /// Creates a history record for a transition.
    #[must_use]
    pub const fn new(
        task_id: TaskId,
        changed_at: DateTime<Utc>,
        changed_by: UserId,
        previous_status: TaskStatus,
        new_status: TaskStatus,
        assigned_to: Option<UserId>,
    ) -> Self {
        Self {
            task_id,
            changed_at,
            changed_by,
            previous_status,
            new_status,
            assigned_to,
        }
    }
}
