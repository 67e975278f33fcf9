//! Given steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use eyre::WrapErr;
use foreman::task::services::CreateTaskRequest;
use rstest_bdd_macros::given;

#[given(r#"a task titled "{title}""#)]
fn a_task_titled(world: &mut TaskLifecycleWorld, title: String) -> Result<(), eyre::Report> {
    let created = run_async(
        world
            .service
            .create_task(CreateTaskRequest::new(world.actor, title)),
    )
    .wrap_err("create task for scenario")?;
    world.task = Some(created);
    Ok(())
}

#[given(r#"the user "{name}" exists"#)]
fn the_user_exists(world: &mut TaskLifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let id = foreman::task::domain::UserId::new();
    world
        .directory
        .insert(id)
        .wrap_err("register scenario user")?;
    world.named_users.insert(name, id);
    Ok(())
}

#[given(r#"the task has been assigned to "{name}""#)]
fn the_task_has_been_assigned(
    world: &mut TaskLifecycleWorld,
    name: String,
) -> Result<(), eyre::Report> {
    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing created task in scenario world"))?;
    let assignee = world
        .named_users
        .get(&name)
        .copied()
        .ok_or_else(|| eyre::eyre!("unknown scenario user {name}"))?;

    let assigned = run_async(
        world
            .service
            .assign_task(task.id(), world.actor, Some(assignee)),
    )
    .wrap_err("assign task in scenario setup")?;
    world.task = Some(assigned);
    Ok(())
}

#[given("the task has been deleted")]
fn the_task_has_been_deleted(world: &mut TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let task = world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing created task in scenario world"))?;
    let deleted = run_async(world.service.delete_task(task.id(), world.actor))
        .wrap_err("delete task in scenario setup")?;
    world.task = Some(deleted);
    Ok(())
}
