//! Task lifecycle status and transition vocabulary.

use super::ParseTaskStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a task.
///
/// `Deleted` is terminal; tasks are never physically removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task exists and has no assignee.
    Open,
    /// Task has an assignee working on it.
    Assigned,
    /// Task work has finished.
    Closed,
    /// Task has been soft-deleted.
    Deleted,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Assigned => "assigned",
            Self::Closed => "closed",
            Self::Deleted => "deleted",
        }
    }

    /// Returns `true` when no transition leads out of this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "assigned" => Ok(Self::Assigned),
            "closed" => Ok(Self::Closed),
            "deleted" => Ok(Self::Deleted),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Names the four status transitions, independent of their payloads.
///
/// Used in error reporting so callers learn which transition was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// Assign the task to a user.
    Assign,
    /// Return an assigned task to the open pool.
    Unassign,
    /// Close an assigned task.
    Close,
    /// Soft-delete the task.
    Delete,
}

impl TransitionKind {
    /// Returns the transition name as used in messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Unassign => "unassign",
            Self::Close => "close",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
