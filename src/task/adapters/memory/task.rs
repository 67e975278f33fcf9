//! In-memory task store for tests and embedding.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::Mutex as RowMutex;
use tokio::time::timeout;

use crate::task::{
    domain::{Task, TaskComment, TaskHistoryRecord, TaskId, TransitionCommand},
    ports::{
        TaskCommentRepository, TaskCommentRepositoryError, TaskCommentRepositoryResult,
        TaskRepository, TaskRepositoryError, TaskRepositoryResult, TransitionOutcome,
    },
};

/// How long a transition waits on a contended row guard before reporting
/// [`TaskRepositoryError::LockTimeout`].
const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(5);

/// Thread-safe in-memory task repository.
///
/// Mirrors the concurrency contract of the `PostgreSQL` adapter: every
/// lifecycle transition runs under an exclusive per-task guard with a bounded
/// wait, and the task mutation and history append commit together. Plain
/// reads and non-lifecycle edits take no guard.
#[derive(Debug, Clone)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
    row_locks: Arc<Mutex<HashMap<TaskId, Arc<RowMutex<()>>>>>,
    lock_wait: Duration,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    creation_order: Vec<TaskId>,
    history: HashMap<TaskId, Vec<TaskHistoryRecord>>,
    comments: HashMap<TaskId, Vec<TaskComment>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the bound a transition waits on a contended row guard.
    #[must_use]
    pub const fn with_lock_wait(mut self, lock_wait: Duration) -> Self {
        self.lock_wait = lock_wait;
        self
    }

    /// Returns the guard serializing transitions for one task id.
    pub(crate) fn row_lock(&self, id: TaskId) -> TaskRepositoryResult<Arc<RowMutex<()>>> {
        let mut locks = self
            .row_locks
            .lock()
            .map_err(|err| TaskRepositoryError::persistence(io::Error::other(err.to_string())))?;
        Ok(Arc::clone(locks.entry(id).or_default()))
    }

    fn read_state(
        &self,
    ) -> TaskRepositoryResult<std::sync::RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state
            .read()
            .map_err(|err| TaskRepositoryError::persistence(io::Error::other(err.to_string())))
    }

    fn write_state(
        &self,
    ) -> TaskRepositoryResult<std::sync::RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state
            .write()
            .map_err(|err| TaskRepositoryError::persistence(io::Error::other(err.to_string())))
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self {
            state: Arc::default(),
            row_locks: Arc::default(),
            lock_wait: DEFAULT_LOCK_WAIT,
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.creation_order.push(task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read_state()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read_state()?;
        Ok(state
            .creation_order
            .iter()
            .filter_map(|id| state.tasks.get(id).cloned())
            .collect())
    }

    async fn update_details(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        if !state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::NotFound(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn transition(
        &self,
        id: TaskId,
        command: TransitionCommand,
    ) -> TaskRepositoryResult<TransitionOutcome> {
        let row_lock = self.row_lock(id)?;
        let Ok(_guard) = timeout(self.lock_wait, row_lock.lock()).await else {
            return Err(TaskRepositoryError::LockTimeout(id));
        };

        // The guard serializes transitions per task; the state lock below
        // makes the task mutation and the history append one atomic unit.
        let mut state = self.write_state()?;
        let current = state
            .tasks
            .get(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        let mut task = current.clone();
        let history = task.apply(&command)?;
        state.tasks.insert(id, task.clone());
        state.history.entry(id).or_default().push(history.clone());
        Ok(TransitionOutcome { task, history })
    }

    async fn list_history(&self, id: TaskId) -> TaskRepositoryResult<Vec<TaskHistoryRecord>> {
        let state = self.read_state()?;
        if !state.tasks.contains_key(&id) {
            return Err(TaskRepositoryError::NotFound(id));
        }
        Ok(state.history.get(&id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl TaskCommentRepository for InMemoryTaskRepository {
    async fn add(&self, comment: &TaskComment) -> TaskCommentRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            TaskCommentRepositoryError::persistence(io::Error::other(err.to_string()))
        })?;
        if !state.tasks.contains_key(&comment.task_id) {
            return Err(TaskCommentRepositoryError::TaskNotFound(comment.task_id));
        }
        state
            .comments
            .entry(comment.task_id)
            .or_default()
            .push(comment.clone());
        Ok(())
    }

    async fn list_for_task(
        &self,
        task_id: TaskId,
    ) -> TaskCommentRepositoryResult<Vec<TaskComment>> {
        let state = self.state.read().map_err(|err| {
            TaskCommentRepositoryError::persistence(io::Error::other(err.to_string()))
        })?;
        if !state.tasks.contains_key(&task_id) {
            return Err(TaskCommentRepositoryError::TaskNotFound(task_id));
        }
        Ok(state.comments.get(&task_id).cloned().unwrap_or_default())
    }
}
