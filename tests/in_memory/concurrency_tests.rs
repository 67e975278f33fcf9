//! Concurrency tests: per-task serialization of lifecycle transitions.

use super::helpers::{Harness, harness};
use foreman::task::{
    domain::{TaskStatus, UserId},
    services::CreateTaskRequest,
};
use rstest::rstest;
use tokio::task::JoinSet;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_mutations_yield_a_causally_consistent_chain(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let users: Vec<UserId> = (0..4).map(|_| harness.known_user()).collect();
    let task = harness
        .service
        .create_task(CreateTaskRequest::new(harness.actor, "Contended lifecycle"))
        .await?;

    let mut workers = JoinSet::new();
    let mut assignees = users.iter().copied().cycle();
    for round in 0..16_usize {
        let service = harness.service.clone();
        let actor = harness.actor;
        let task_id = task.id();
        let assignee = assignees
            .next()
            .ok_or_else(|| eyre::eyre!("assignee pool is empty"))?;
        workers.spawn(async move {
            // Outcomes are irrelevant here; only the history shape matters.
            let _ = match round & 3 {
                0 => service.assign_task(task_id, actor, Some(assignee)).await,
                1 => service.unassign_task(task_id, actor).await,
                2 => service.close_task(task_id, actor).await,
                _ => service.delete_task(task_id, actor).await,
            };
        });
    }
    while workers.join_next().await.is_some() {}

    let history = harness.service.list_history(task.id()).await?;
    let mut expected_previous = TaskStatus::Open;
    for record in &history {
        eyre::ensure!(
            record.previous_status == expected_previous,
            "record claims previous {} but the chain was at {}",
            record.previous_status,
            expected_previous
        );
        expected_previous = record.new_status;
    }

    let final_task = harness.service.get_task(task.id()).await?;
    eyre::ensure!(
        final_task.status() == expected_previous,
        "task status {} does not match the end of the chain {}",
        final_task.status(),
        expected_previous
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_closes_commit_exactly_once(harness: Harness) -> Result<(), eyre::Report> {
    let assignee = harness.known_user();
    let task = harness
        .service
        .create_task(CreateTaskRequest::new(harness.actor, "Raced close"))
        .await?;
    harness
        .service
        .assign_task(task.id(), harness.actor, Some(assignee))
        .await?;

    let mut workers = JoinSet::new();
    for _ in 0..8 {
        let service = harness.service.clone();
        let actor = harness.actor;
        let task_id = task.id();
        workers.spawn(async move { service.close_task(task_id, actor).await });
    }
    let mut successes = 0_usize;
    while let Some(joined) = workers.join_next().await {
        if joined?.is_ok() {
            successes += 1;
        }
    }

    eyre::ensure!(successes == 1, "exactly one close may win, got {successes}");
    let history = harness.service.list_history(task.id()).await?;
    let closes = history
        .iter()
        .filter(|record| record.new_status == TaskStatus::Closed)
        .count();
    eyre::ensure!(closes == 1, "exactly one close record may exist, got {closes}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transitions_on_distinct_tasks_do_not_interfere(
    harness: Harness,
) -> Result<(), eyre::Report> {
    let assignee = harness.known_user();
    let mut task_ids = Vec::new();
    for index in 0..8 {
        let task = harness
            .service
            .create_task(CreateTaskRequest::new(harness.actor, format!("Parallel {index}")))
            .await?;
        harness
            .service
            .assign_task(task.id(), harness.actor, Some(assignee))
            .await?;
        task_ids.push(task.id());
    }

    let mut workers = JoinSet::new();
    for task_id in task_ids.clone() {
        let service = harness.service.clone();
        let actor = harness.actor;
        workers.spawn(async move { service.close_task(task_id, actor).await });
    }
    while let Some(joined) = workers.join_next().await {
        let closed = joined??;
        eyre::ensure!(closed.status() == TaskStatus::Closed);
    }

    for task_id in task_ids {
        let history = harness.service.list_history(task_id).await?;
        eyre::ensure!(history.len() == 2, "each task owns exactly its own records");
    }
    Ok(())
}
