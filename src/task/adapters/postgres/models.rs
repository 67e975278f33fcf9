//! Diesel row models for task persistence.

use super::schema::{task_comments, task_history, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Lifecycle status.
    pub status: String,
    /// Ordinal priority.
    pub priority: String,
    /// Creating actor.
    pub created_by: uuid::Uuid,
    /// Current assignee.
    pub assigned_to: Option<uuid::Uuid>,
    /// Actor who performed the current assignment.
    pub assigned_by: Option<uuid::Uuid>,
    /// Actor who closed the task.
    pub closed_by: Option<uuid::Uuid>,
    /// Actor who deleted the task.
    pub deleted_by: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Current assignment timestamp.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Closing timestamp.
    pub closed_at: Option<DateTime<Utc>>,
    /// Deletion timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Lifecycle status.
    pub status: String,
    /// Ordinal priority.
    pub priority: String,
    /// Creating actor.
    pub created_by: uuid::Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for history records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskHistoryRow {
    /// Storage sequence.
    pub id: i64,
    /// Task the transition was applied to.
    pub task_id: uuid::Uuid,
    /// Transition timestamp.
    pub changed_at: DateTime<Utc>,
    /// Actor who performed the transition.
    pub changed_by: uuid::Uuid,
    /// Status before the transition.
    pub previous_status: String,
    /// Status after the transition.
    pub new_status: String,
    /// Assignee for assignment transitions.
    pub assigned_to: Option<uuid::Uuid>,
}

/// Insert model for history records; the storage sequence is assigned by
/// the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_history)]
pub struct NewTaskHistoryRow {
    /// Task the transition was applied to.
    pub task_id: uuid::Uuid,
    /// Transition timestamp.
    pub changed_at: DateTime<Utc>,
    /// Actor who performed the transition.
    pub changed_by: uuid::Uuid,
    /// Status before the transition.
    pub previous_status: String,
    /// Status after the transition.
    pub new_status: String,
    /// Assignee for assignment transitions.
    pub assigned_to: Option<uuid::Uuid>,
}

/// Query result row for comment records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskCommentRow {
    /// Storage sequence.
    pub id: i64,
    /// Task the comment belongs to.
    pub task_id: uuid::Uuid,
    /// Comment timestamp.
    pub commented_at: DateTime<Utc>,
    /// Comment author.
    pub commented_by: uuid::Uuid,
    /// Comment body.
    pub comment: String,
}

/// Insert model for comment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_comments)]
pub struct NewTaskCommentRow {
    /// Task the comment belongs to.
    pub task_id: uuid::Uuid,
    /// Comment timestamp.
    pub commented_at: DateTime<Utc>,
    /// Comment author.
    pub commented_by: uuid::Uuid,
    /// Comment body.
    pub comment: String,
}
