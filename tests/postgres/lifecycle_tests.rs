//! `PostgreSQL` integration tests for lifecycle transitions.

use super::helpers::{BoxError, DATABASE_URL_ENV, setup};
use foreman::task::{
    domain::{Task, TaskPriority, TaskStatus, TaskTitle, TransitionKind},
    ports::{TaskRepository, TaskRepositoryError},
    services::{CreateTaskRequest, TaskLifecycleError, UpdateTaskRequest},
};
use mockable::DefaultClock;
use rstest::rstest;
use tokio::task::JoinSet;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_full_lifecycle_builds_a_three_record_chain() -> Result<(), BoxError> {
    let Some(harness) = setup().await? else {
        eprintln!("skipping: {DATABASE_URL_ENV} not set");
        return Ok(());
    };
    let assignee = harness.register_user().await?;

    let task = harness
        .service
        .create_task(
            CreateTaskRequest::new(harness.actor, "New Task")
                .with_description("Task description")
                .with_priority(TaskPriority::Medium),
        )
        .await?;
    assert_eq!(task.status(), TaskStatus::Open);

    let assigned = harness
        .service
        .assign_task(task.id(), harness.actor, Some(assignee))
        .await?;
    assert_eq!(assigned.status(), TaskStatus::Assigned);
    assert_eq!(assigned.assigned_to(), Some(assignee));

    harness.service.close_task(task.id(), harness.actor).await?;
    let deleted = harness.service.delete_task(task.id(), harness.actor).await?;
    assert_eq!(deleted.status(), TaskStatus::Deleted);

    let history = harness.service.list_history(task.id()).await?;
    let transitions: Vec<_> = history
        .iter()
        .map(|record| (record.previous_status, record.new_status))
        .collect();
    assert_eq!(
        transitions,
        vec![
            (TaskStatus::Open, TaskStatus::Assigned),
            (TaskStatus::Assigned, TaskStatus::Closed),
            (TaskStatus::Closed, TaskStatus::Deleted),
        ]
    );
    let first = history.first().expect("assignment record");
    assert_eq!(first.assigned_to, Some(assignee));
    assert_eq!(first.changed_by, harness.actor);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_rejected_transition_rolls_back_cleanly() -> Result<(), BoxError> {
    let Some(harness) = setup().await? else {
        eprintln!("skipping: {DATABASE_URL_ENV} not set");
        return Ok(());
    };

    let task = harness
        .service
        .create_task(CreateTaskRequest::new(harness.actor, "Never assigned"))
        .await?;

    let result = harness.service.close_task(task.id(), harness.actor).await;
    assert!(
        matches!(
            result,
            Err(TaskLifecycleError::InvalidTransition {
                status: TaskStatus::Open,
                transition: TransitionKind::Close,
                ..
            })
        ),
        "expected InvalidTransition, got {result:?}"
    );

    let unchanged = harness.service.get_task(task.id()).await?;
    assert_eq!(unchanged.status(), TaskStatus::Open);
    let history = harness.service.list_history(task.id()).await?;
    assert!(history.is_empty(), "the aborted unit must leave no history");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_concurrent_closes_commit_exactly_once() -> Result<(), BoxError> {
    let Some(harness) = setup().await? else {
        eprintln!("skipping: {DATABASE_URL_ENV} not set");
        return Ok(());
    };
    let assignee = harness.register_user().await?;

    let task = harness
        .service
        .create_task(CreateTaskRequest::new(harness.actor, "Raced close"))
        .await?;
    harness
        .service
        .assign_task(task.id(), harness.actor, Some(assignee))
        .await?;

    let mut workers = JoinSet::new();
    for _ in 0..4 {
        let service = harness.service.clone();
        let actor = harness.actor;
        let task_id = task.id();
        workers.spawn(async move { service.close_task(task_id, actor).await });
    }
    let mut successes = 0_usize;
    while let Some(joined) = workers.join_next().await {
        if joined.map_err(|err| Box::new(err) as BoxError)?.is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1, "the row lock must let exactly one close win");

    let history = harness.service.list_history(task.id()).await?;
    let closes = history
        .iter()
        .filter(|record| record.new_status == TaskStatus::Closed)
        .count();
    assert_eq!(closes, 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_duplicate_task_id_is_rejected() -> Result<(), BoxError> {
    let Some(harness) = setup().await? else {
        eprintln!("skipping: {DATABASE_URL_ENV} not set");
        return Ok(());
    };

    let clock = DefaultClock;
    let title = TaskTitle::new("Duplicated id")?;
    let task = Task::new(title, "", TaskPriority::default(), harness.actor, &clock);
    harness.repository.create(&task).await?;

    let result = harness.repository.create(&task).await;
    assert!(
        matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()),
        "expected DuplicateTask, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_update_details_persists_without_history() -> Result<(), BoxError> {
    let Some(harness) = setup().await? else {
        eprintln!("skipping: {DATABASE_URL_ENV} not set");
        return Ok(());
    };

    let task = harness
        .service
        .create_task(CreateTaskRequest::new(harness.actor, "Task to update"))
        .await?;
    harness
        .service
        .update_task(
            UpdateTaskRequest::new(task.id())
                .with_title("Updated Task")
                .with_description("Updated description")
                .with_priority(TaskPriority::High),
        )
        .await?;

    let fetched = harness.service.get_task(task.id()).await?;
    assert_eq!(fetched.title().as_str(), "Updated Task");
    assert_eq!(fetched.description(), "Updated description");
    assert_eq!(fetched.priority(), TaskPriority::High);
    assert_eq!(fetched.status(), TaskStatus::Open);

    let history = harness.service.list_history(task.id()).await?;
    assert!(history.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_soft_delete_keeps_the_row_readable() -> Result<(), BoxError> {
    let Some(harness) = setup().await? else {
        eprintln!("skipping: {DATABASE_URL_ENV} not set");
        return Ok(());
    };

    let task = harness
        .service
        .create_task(CreateTaskRequest::new(harness.actor, "Soft deleted"))
        .await?;
    harness.service.delete_task(task.id(), harness.actor).await?;

    let fetched = harness.service.get_task(task.id()).await?;
    assert_eq!(fetched.status(), TaskStatus::Deleted);
    assert_eq!(fetched.deleted_by(), Some(harness.actor));
    assert!(fetched.deleted_at().is_some());

    let listed = harness.service.list_tasks().await?;
    assert_eq!(listed.len(), 1);
    Ok(())
}
