//! Application services for the task lifecycle core.

mod comments;
mod lifecycle;

pub use comments::{TaskCommentError, TaskCommentResult, TaskCommentService};
pub use lifecycle::{
    CreateTaskRequest, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
    UpdateTaskRequest,
};
