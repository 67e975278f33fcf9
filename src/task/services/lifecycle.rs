//! Service layer for the task lifecycle engine.
//!
//! [`TaskLifecycleService`] is the sole writer of task status: every status
//! change goes through [`TaskRepository::transition`], which serializes
//! concurrent mutations per task and commits the history record in the same
//! atomic unit. Plain field edits and reads bypass that path.

use crate::task::{
    domain::{
        Task, TaskDomainError, TaskEdit, TaskHistoryRecord, TaskId, TaskPriority, TaskStatus,
        TaskTitle, TaskTransition, TransitionCommand, TransitionKind, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError, UserDirectory},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    created_by: UserId,
    title: String,
    description: String,
    priority: TaskPriority,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields; priority defaults to
    /// [`TaskPriority::Minor`] and the description to empty.
    #[must_use]
    pub fn new(created_by: UserId, title: impl Into<String>) -> Self {
        Self {
            created_by,
            title: title.into(),
            description: String::new(),
            priority: TaskPriority::default(),
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the task priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Request payload for a partial edit of the non-lifecycle task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    task_id: TaskId,
    title: Option<String>,
    description: Option<String>,
    priority: Option<TaskPriority>,
}

impl UpdateTaskRequest {
    /// Creates an empty edit for the given task.
    #[must_use]
    pub const fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            title: None,
            description: None,
            priority: None,
        }
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Caller-facing error taxonomy of the lifecycle engine.
///
/// Every failure maps to exactly one of these kinds so adapters can render
/// client errors, retryable contention, and server faults distinctly.
#[derive(Debug, Clone, Error)]
pub enum TaskLifecycleError {
    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The requested assignee does not exist in the user directory.
    #[error("user not found: {0}")]
    AssigneeNotFound(UserId),

    /// The request carried malformed or missing input.
    #[error(transparent)]
    InvalidArgument(TaskDomainError),

    /// The transition is not legal from the task's current status.
    #[error("cannot {transition} task {task_id}: current status is {status}")]
    InvalidTransition {
        /// Task the transition was attempted on.
        task_id: TaskId,
        /// Status the task held when the transition was attempted.
        status: TaskStatus,
        /// The transition that was attempted.
        transition: TransitionKind,
    },

    /// A concurrent transition held the task's guard past the lock-wait
    /// bound. Retryable; the engine itself never retries.
    #[error("task {0} is busy: lock-wait timed out")]
    Busy(TaskId),

    /// Unexpected store failure; any in-progress atomic unit was rolled
    /// back.
    #[error("internal storage error: {0}")]
    Internal(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskLifecycleError {
    /// Returns `true` for failures caused by the request rather than the
    /// service: absent references, bad input, illegal transitions.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::AssigneeNotFound(_)
                | Self::InvalidArgument(_)
                | Self::InvalidTransition { .. }
        )
    }

    /// Returns `true` when the operation may succeed if simply retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

impl From<TaskRepositoryError> for TaskLifecycleError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => Self::NotFound(id),
            TaskRepositoryError::Transition(TaskDomainError::InvalidTransition {
                task_id,
                status,
                transition,
            }) => Self::InvalidTransition {
                task_id,
                status,
                transition,
            },
            TaskRepositoryError::Transition(other) => Self::InvalidArgument(other),
            TaskRepositoryError::LockTimeout(id) => Self::Busy(id),
            TaskRepositoryError::Persistence(source) => Self::Internal(source),
            // Task ids are generated by the service; a duplicate means the
            // store is corrupt, not that the caller erred.
            duplicate @ TaskRepositoryError::DuplicateTask(_) => {
                Self::Internal(Arc::new(duplicate))
            }
        }
    }
}

/// Result type for lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
pub struct TaskLifecycleService<R, U, C>
where
    R: TaskRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    users: Arc<U>,
    clock: Arc<C>,
}

impl<R, U, C> Clone for TaskLifecycleService<R, U, C>
where
    R: TaskRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            users: Arc::clone(&self.users),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, U, C> TaskLifecycleService<R, U, C>
where
    R: TaskRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            repository,
            users,
            clock,
        }
    }

    /// Creates a new task in `Open` status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::InvalidArgument`] when the title is
    /// empty or overlong; no row is touched in that case.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let title = TaskTitle::new(request.title).map_err(TaskLifecycleError::InvalidArgument)?;
        let task = Task::new(
            title,
            request.description,
            request.priority,
            request.created_by,
            &*self.clock,
        );
        self.repository.create(&task).await?;
        info!(task_id = %task.id(), "task created");
        Ok(task)
    }

    /// Fetches one task by id; soft-deleted tasks are returned like any
    /// other.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when no task has the id.
    pub async fn get_task(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    /// Returns all tasks in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Internal`] when the store fails.
    pub async fn list_tasks(&self) -> TaskLifecycleResult<Vec<Task>> {
        Ok(self.repository.list().await?)
    }

    /// Applies a partial edit of title, description, and priority.
    ///
    /// Permitted in every status; bypasses the transition path and produces
    /// no history record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist
    /// and [`TaskLifecycleError::InvalidArgument`] when a replacement title
    /// fails validation.
    pub async fn update_task(&self, request: UpdateTaskRequest) -> TaskLifecycleResult<Task> {
        let mut task = self.get_task(request.task_id).await?;
        let title = request
            .title
            .map(TaskTitle::new)
            .transpose()
            .map_err(TaskLifecycleError::InvalidArgument)?;
        task.edit_details(
            TaskEdit {
                title,
                description: request.description,
                priority: request.priority,
            },
            &*self.clock,
        );
        self.repository.update_details(&task).await?;
        debug!(task_id = %task.id(), "task details updated");
        Ok(task)
    }

    /// Assigns (or reassigns) the task to a user.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::InvalidArgument`] when no assignee is
    /// supplied, [`TaskLifecycleError::AssigneeNotFound`] when the assignee
    /// is unknown, and otherwise [`TaskLifecycleError::NotFound`],
    /// [`TaskLifecycleError::InvalidTransition`], or
    /// [`TaskLifecycleError::Busy`] per the lifecycle contract.
    pub async fn assign_task(
        &self,
        task_id: TaskId,
        actor: UserId,
        assignee: Option<UserId>,
    ) -> TaskLifecycleResult<Task> {
        let target = assignee.ok_or(TaskLifecycleError::InvalidArgument(
            TaskDomainError::MissingAssignee,
        ))?;
        let known = self
            .users
            .exists(target)
            .await
            .map_err(|err| TaskLifecycleError::Internal(err.0))?;
        if !known {
            return Err(TaskLifecycleError::AssigneeNotFound(target));
        }
        self.run_transition(task_id, TaskTransition::Assign { assignee: target }, actor)
            .await
    }

    /// Returns an assigned task to the open pool.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`],
    /// [`TaskLifecycleError::InvalidTransition`], or
    /// [`TaskLifecycleError::Busy`] per the lifecycle contract.
    pub async fn unassign_task(&self, task_id: TaskId, actor: UserId) -> TaskLifecycleResult<Task> {
        self.run_transition(task_id, TaskTransition::Unassign, actor)
            .await
    }

    /// Closes an assigned task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`],
    /// [`TaskLifecycleError::InvalidTransition`], or
    /// [`TaskLifecycleError::Busy`] per the lifecycle contract.
    pub async fn close_task(&self, task_id: TaskId, actor: UserId) -> TaskLifecycleResult<Task> {
        self.run_transition(task_id, TaskTransition::Close, actor)
            .await
    }

    /// Soft-deletes a task; the row is kept and `Deleted` is terminal.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`],
    /// [`TaskLifecycleError::InvalidTransition`] when already deleted, or
    /// [`TaskLifecycleError::Busy`] per the lifecycle contract.
    pub async fn delete_task(&self, task_id: TaskId, actor: UserId) -> TaskLifecycleResult<Task> {
        self.run_transition(task_id, TaskTransition::Delete, actor)
            .await
    }

    /// Returns the task's transition history in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not
    /// exist.
    pub async fn list_history(
        &self,
        task_id: TaskId,
    ) -> TaskLifecycleResult<Vec<TaskHistoryRecord>> {
        Ok(self.repository.list_history(task_id).await?)
    }

    async fn run_transition(
        &self,
        task_id: TaskId,
        transition: TaskTransition,
        actor: UserId,
    ) -> TaskLifecycleResult<Task> {
        let command = TransitionCommand::new(transition, actor, &*self.clock);
        let outcome = self.repository.transition(task_id, command).await?;
        info!(
            task_id = %task_id,
            from = %outcome.history.previous_status,
            to = %outcome.history.new_status,
            "task transition committed"
        );
        Ok(outcome.task)
    }
}
