//! Comment subsystem integration tests.

use super::helpers::{Harness, harness};
use foreman::task::{
    domain::TaskId,
    services::{CreateTaskRequest, TaskCommentError},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comments_list_in_creation_order(harness: Harness) -> Result<(), eyre::Report> {
    let task = harness
        .service
        .create_task(CreateTaskRequest::new(harness.actor, "Discussed task"))
        .await?;

    for body in ["first", "second", "third"] {
        harness
            .comments
            .add_comment(task.id(), harness.actor, body)
            .await?;
    }

    let listed = harness.comments.list_comments(task.id()).await?;
    let bodies: Vec<_> = listed
        .iter()
        .map(|comment| comment.comment.as_str().to_owned())
        .collect();
    eyre::ensure!(bodies == vec!["first", "second", "third"], "got {bodies:?}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comment_lands_on_a_deleted_task(harness: Harness) -> Result<(), eyre::Report> {
    let task = harness
        .service
        .create_task(CreateTaskRequest::new(harness.actor, "Deleted but discussed"))
        .await?;
    harness.service.delete_task(task.id(), harness.actor).await?;

    let comment = harness
        .comments
        .add_comment(task.id(), harness.actor, "post-deletion note")
        .await?;

    let listed = harness.comments.list_comments(task.id()).await?;
    eyre::ensure!(listed == vec![comment.clone()]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comment_on_unknown_task_is_rejected(harness: Harness) {
    let ghost = TaskId::new();
    let result = harness
        .comments
        .add_comment(ghost, harness.actor, "lost words")
        .await;
    assert!(matches!(result, Err(TaskCommentError::NotFound(id)) if id == ghost));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comment_carries_author_and_timestamp(harness: Harness) -> Result<(), eyre::Report> {
    let task = harness
        .service
        .create_task(CreateTaskRequest::new(harness.actor, "Timestamped"))
        .await?;

    let comment = harness
        .comments
        .add_comment(task.id(), harness.actor, "when was this?")
        .await?;

    eyre::ensure!(comment.commented_by == harness.actor);
    eyre::ensure!(comment.task_id == task.id());
    eyre::ensure!(comment.commented_at >= task.created_at());
    Ok(())
}
