//! Task aggregate root and the lifecycle transition function.

use super::{
    TaskDomainError, TaskHistoryRecord, TaskId, TaskPriority, TaskStatus, TaskTitle,
    TransitionKind, UserId,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A status transition request, including its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskTransition {
    /// Assign the task to `assignee`. Legal from `Open` and `Assigned`
    /// (reassignment of an already-assigned task is permitted).
    Assign {
        /// User the task is handed to.
        assignee: UserId,
    },
    /// Return the task to the open pool. Legal from `Assigned` only.
    Unassign,
    /// Close the task. Legal from `Assigned` only.
    Close,
    /// Soft-delete the task. Legal from every status except `Deleted`.
    Delete,
}

impl TaskTransition {
    /// Returns the payload-free name of this transition.
    #[must_use]
    pub const fn kind(self) -> TransitionKind {
        match self {
            Self::Assign { .. } => TransitionKind::Assign,
            Self::Unassign => TransitionKind::Unassign,
            Self::Close => TransitionKind::Close,
            Self::Delete => TransitionKind::Delete,
        }
    }
}

/// A transition together with the actor performing it and the time it was
/// requested.
///
/// The timestamp is captured once, when the command is built, so every field
/// the transition touches (status timestamps, `updated_at`, the history
/// record) carries the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionCommand {
    transition: TaskTransition,
    actor: UserId,
    occurred_at: DateTime<Utc>,
}

impl TransitionCommand {
    /// Creates a command stamped with the current clock time.
    #[must_use]
    pub fn new(transition: TaskTransition, actor: UserId, clock: &impl Clock) -> Self {
        Self {
            transition,
            actor,
            occurred_at: clock.utc(),
        }
    }

    /// Returns the requested transition.
    #[must_use]
    pub const fn transition(&self) -> TaskTransition {
        self.transition
    }

    /// Returns the actor performing the transition.
    #[must_use]
    pub const fn actor(&self) -> UserId {
        self.actor
    }

    /// Returns the instant the command was issued.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Partial edit of the non-lifecycle task fields.
///
/// Absent fields are left untouched. Edits never change status and never
/// produce history records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    /// Replacement title, already validated.
    pub title: Option<TaskTitle>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement priority.
    pub priority: Option<TaskPriority>,
}

/// Task aggregate root.
///
/// Status is only ever changed through [`Task::apply`]; all other mutation
/// goes through [`Task::edit_details`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: String,
    priority: TaskPriority,
    status: TaskStatus,
    created_by: UserId,
    assigned_to: Option<UserId>,
    assigned_by: Option<UserId>,
    closed_by: Option<UserId>,
    deleted_by: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    assigned_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: String,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted creator.
    pub created_by: UserId,
    /// Persisted assignee, if any.
    pub assigned_to: Option<UserId>,
    /// Persisted assigning actor, if any.
    pub assigned_by: Option<UserId>,
    /// Persisted closing actor, if any.
    pub closed_by: Option<UserId>,
    /// Persisted deleting actor, if any.
    pub deleted_by: Option<UserId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted assignment timestamp, if any.
    pub assigned_at: Option<DateTime<Utc>>,
    /// Persisted closing timestamp, if any.
    pub closed_at: Option<DateTime<Utc>>,
    /// Persisted deletion timestamp, if any.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new task in `Open` status.
    #[must_use]
    pub fn new(
        title: TaskTitle,
        description: impl Into<String>,
        priority: TaskPriority,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title,
            description: description.into(),
            priority,
            status: TaskStatus::Open,
            created_by,
            assigned_to: None,
            assigned_by: None,
            closed_by: None,
            deleted_by: None,
            created_at: timestamp,
            updated_at: timestamp,
            assigned_at: None,
            closed_at: None,
            deleted_at: None,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            priority: data.priority,
            status: data.status,
            created_by: data.created_by,
            assigned_to: data.assigned_to,
            assigned_by: data.assigned_by,
            closed_by: data.closed_by,
            deleted_by: data.deleted_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
            assigned_at: data.assigned_at,
            closed_at: data.closed_at,
            deleted_at: data.deleted_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the task priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the task lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the actor who created the task.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the current assignee, if any.
    #[must_use]
    pub const fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
    }

    /// Returns the actor who performed the current assignment, if any.
    #[must_use]
    pub const fn assigned_by(&self) -> Option<UserId> {
        self.assigned_by
    }

    /// Returns the actor who closed the task, if any.
    #[must_use]
    pub const fn closed_by(&self) -> Option<UserId> {
        self.closed_by
    }

    /// Returns the actor who deleted the task, if any.
    #[must_use]
    pub const fn deleted_by(&self) -> Option<UserId> {
        self.deleted_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the current assignment timestamp, if any.
    #[must_use]
    pub const fn assigned_at(&self) -> Option<DateTime<Utc>> {
        self.assigned_at
    }

    /// Returns the closing timestamp, if any.
    #[must_use]
    pub const fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    /// Returns the deletion timestamp, if any.
    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Applies a status transition, returning the matching history record.
    ///
    /// This is the single place status changes: precondition validation, the
    /// new field set, and the history entry are computed together so the
    /// aggregate and its audit log cannot drift apart. Callers persist the
    /// mutated task and the returned record in one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTransition`] when the transition is
    /// not legal from the current status; the task is left unchanged.
    pub fn apply(&mut self, command: &TransitionCommand) -> Result<TaskHistoryRecord, TaskDomainError> {
        let transition = command.transition();
        let previous_status = self.status;
        let new_status = self.transition_target(transition)?;
        let actor = command.actor();
        let now = command.occurred_at();

        let mut history_assignee = None;
        match transition {
            TaskTransition::Assign { assignee } => {
                self.assigned_to = Some(assignee);
                self.assigned_by = Some(actor);
                self.assigned_at = Some(now);
                history_assignee = Some(assignee);
            }
            TaskTransition::Unassign => {
                self.assigned_to = None;
                self.assigned_by = None;
                self.assigned_at = None;
            }
            TaskTransition::Close => {
                self.closed_by = Some(actor);
                self.closed_at = Some(now);
            }
            TaskTransition::Delete => {
                self.deleted_by = Some(actor);
                self.deleted_at = Some(now);
            }
        }
        self.status = new_status;
        self.updated_at = now;

        Ok(TaskHistoryRecord::new(
            self.id,
            now,
            actor,
            previous_status,
            new_status,
            history_assignee,
        ))
    }

    /// Applies a partial edit of title, description, and priority.
    ///
    /// Permitted in every status; refreshes `updated_at` and nothing else.
    pub fn edit_details(&mut self, edit: TaskEdit, clock: &impl Clock) {
        if let Some(title) = edit.title {
            self.title = title;
        }
        if let Some(description) = edit.description {
            self.description = description;
        }
        if let Some(priority) = edit.priority {
            self.priority = priority;
        }
        self.touch(clock);
    }

    /// Resolves the target status for a transition, or rejects it.
    fn transition_target(&self, transition: TaskTransition) -> Result<TaskStatus, TaskDomainError> {
        let allowed = match transition {
            TaskTransition::Assign { .. } => {
                matches!(self.status, TaskStatus::Open | TaskStatus::Assigned)
            }
            TaskTransition::Unassign | TaskTransition::Close => self.status == TaskStatus::Assigned,
            TaskTransition::Delete => self.status != TaskStatus::Deleted,
        };
        if !allowed {
            return Err(TaskDomainError::InvalidTransition {
                task_id: self.id,
                status: self.status,
                transition: transition.kind(),
            });
        }
        Ok(match transition {
            TaskTransition::Assign { .. } => TaskStatus::Assigned,
            TaskTransition::Unassign => TaskStatus::Open,
            TaskTransition::Close => TaskStatus::Closed,
            TaskTransition::Delete => TaskStatus::Deleted,
        })
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
