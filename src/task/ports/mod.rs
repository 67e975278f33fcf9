//! Port contracts for the task lifecycle core.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod comments;
pub mod repository;
pub mod users;

pub use comments::{TaskCommentRepository, TaskCommentRepositoryError, TaskCommentRepositoryResult};
pub use repository::{
    TaskRepository, TaskRepositoryError, TaskRepositoryResult, TransitionOutcome,
};
pub use users::{UserDirectory, UserDirectoryError, UserDirectoryResult};
