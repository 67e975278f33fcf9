//! Shared world state for task lifecycle BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use foreman::task::{
    adapters::memory::{InMemoryTaskRepository, InMemoryUserDirectory},
    domain::{Task, UserId},
    services::{TaskLifecycleError, TaskLifecycleService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestTaskService =
    TaskLifecycleService<InMemoryTaskRepository, InMemoryUserDirectory, DefaultClock>;

/// Scenario world for task lifecycle behaviour tests.
pub struct TaskLifecycleWorld {
    /// Lifecycle service under test.
    pub service: TestTaskService,
    /// Directory the service resolves assignees against.
    pub directory: Arc<InMemoryUserDirectory>,
    /// Users registered by name during the scenario.
    pub named_users: HashMap<String, UserId>,
    /// Acting identity for every scenario request.
    pub actor: UserId,
    /// Task created by the scenario background, updated on success.
    pub task: Option<Task>,
    /// Outcome of the most recent lifecycle operation.
    pub last_result: Option<Result<Task, TaskLifecycleError>>,
}

impl TaskLifecycleWorld {
    /// Creates a world with empty pending scenario state.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let directory = Arc::new(InMemoryUserDirectory::new());
        let service =
            TaskLifecycleService::new(repository, directory.clone(), Arc::new(DefaultClock));

        Self {
            service,
            directory,
            named_users: HashMap::new(),
            actor: UserId::new(),
            task: None,
            last_result: None,
        }
    }
}

impl Default for TaskLifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskLifecycleWorld {
    TaskLifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
