//! Domain model for the task lifecycle core.
//!
//! The task domain models task creation, the four status transitions
//! (assign, unassign, close, delete), the append-only transition history,
//! and status-independent comments, while keeping all infrastructure
//! concerns outside of the domain boundary.

mod comment;
mod error;
mod history;
mod ids;
mod priority;
mod status;
mod task;

pub use comment::TaskComment;
pub use error::{ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError};
pub use history::TaskHistoryRecord;
pub use ids::{CommentText, TaskId, TaskTitle, UserId};
pub use priority::TaskPriority;
pub use status::{TaskStatus, TransitionKind};
pub use task::{PersistedTaskData, Task, TaskEdit, TaskTransition, TransitionCommand};
