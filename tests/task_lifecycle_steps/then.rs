//! Then steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use foreman::task::{domain::TaskStatus, services::TaskLifecycleError};
use rstest_bdd_macros::then;

#[then(r#"the task status is "{status}""#)]
fn the_task_status_is(world: &TaskLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;

    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing created task"))?;

    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            task.status().as_str()
        ));
    }
    Ok(())
}

#[then("the operation fails with an invalid transition error")]
fn the_operation_fails_with_invalid_transition(
    world: &TaskLifecycleWorld,
) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing operation result"))?;

    if !matches!(result, Err(TaskLifecycleError::InvalidTransition { .. })) {
        return Err(eyre::eyre!(
            "expected InvalidTransition error, got {result:?}"
        ));
    }
    Ok(())
}

#[then(r#"the task history records "{from}" to "{to}""#)]
fn the_task_history_records(
    world: &TaskLifecycleWorld,
    from: String,
    to: String,
) -> Result<(), eyre::Report> {
    let expected_from = TaskStatus::try_from(from.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let expected_to = TaskStatus::try_from(to.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;

    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing created task"))?;
    let history = run_async(world.service.list_history(task.id()))
        .map_err(|err| eyre::eyre!("history lookup failed: {err}"))?;
    let last = history
        .last()
        .ok_or_else(|| eyre::eyre!("history is empty"))?;

    if last.previous_status != expected_from || last.new_status != expected_to {
        return Err(eyre::eyre!(
            "expected {} to {}, found {} to {}",
            expected_from,
            expected_to,
            last.previous_status,
            last.new_status
        ));
    }
    Ok(())
}
