//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    blocking::{TaskPgPool, get_conn_with, run_blocking_with},
    models::{
        NewTaskCommentRow, NewTaskHistoryRow, NewTaskRow, TaskCommentRow, TaskHistoryRow, TaskRow,
    },
    schema::{task_comments, task_history, tasks},
};
use crate::task::{
    domain::{
        CommentText, PersistedTaskData, Task, TaskComment, TaskHistoryRecord, TaskId,
        TaskPriority, TaskStatus, TaskTitle, TransitionCommand, UserId,
    },
    ports::{
        TaskCommentRepository, TaskCommentRepositoryError, TaskCommentRepositoryResult,
        TaskRepository, TaskRepositoryError, TaskRepositoryResult, TransitionOutcome,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Bounds the wait for the exclusive row lock taken by a transition.
///
/// `SET LOCAL` scopes the setting to the enclosing transaction, so ordinary
/// reads and writes on the same pooled connection are unaffected.
const LOCK_WAIT_SQL: &str = "SET LOCAL lock_timeout = '5s'";

/// `PostgreSQL`-backed task repository.
///
/// Lifecycle transitions run inside a database transaction holding a
/// `SELECT ... FOR UPDATE` row lock on the target task, so concurrent
/// transitions on one task serialize while different tasks proceed
/// independently. The history append commits or rolls back with the task
/// mutation.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection = get_conn_with(&pool, TaskRepositoryError::persistence)?;
                f(&mut connection)
            },
            TaskRepositoryError::persistence,
        )
        .await
    }

    async fn run_comment_blocking<F, T>(&self, f: F) -> TaskCommentRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskCommentRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection =
                    get_conn_with(&pool, TaskCommentRepositoryError::persistence)?;
                f(&mut connection)
            },
            TaskCommentRepositoryError::persistence,
        )
        .await
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list(&self) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .order(tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn update_details(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let title = task.title().as_str().to_owned();
        let description = task.description().to_owned();
        let priority = task.priority().as_str().to_owned();
        let updated_at = task.updated_at();

        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.find(task_id.into_inner()))
                .set((
                    tasks::title.eq(title),
                    tasks::description.eq(description),
                    tasks::priority.eq(priority),
                    tasks::updated_at.eq(updated_at),
                ))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn transition(
        &self,
        id: TaskId,
        command: TransitionCommand,
    ) -> TaskRepositoryResult<TransitionOutcome> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::sql_query(LOCK_WAIT_SQL).execute(tx)?;

                let locked_row = tasks::table
                    .find(id.into_inner())
                    .select(TaskRow::as_select())
                    .for_update()
                    .first::<TaskRow>(tx)
                    .optional()
                    .map_err(|err| map_row_lock_error(err, id))?;
                let Some(current) = locked_row else {
                    return Err(TaskRepositoryError::NotFound(id));
                };

                let mut task = row_to_task(current)?;
                let history = task.apply(&command)?;

                diesel::update(tasks::table.find(id.into_inner()))
                    .set((
                        tasks::status.eq(task.status().as_str()),
                        tasks::assigned_to.eq(task.assigned_to().map(UserId::into_inner)),
                        tasks::assigned_by.eq(task.assigned_by().map(UserId::into_inner)),
                        tasks::closed_by.eq(task.closed_by().map(UserId::into_inner)),
                        tasks::deleted_by.eq(task.deleted_by().map(UserId::into_inner)),
                        tasks::updated_at.eq(task.updated_at()),
                        tasks::assigned_at.eq(task.assigned_at()),
                        tasks::closed_at.eq(task.closed_at()),
                        tasks::deleted_at.eq(task.deleted_at()),
                    ))
                    .execute(tx)?;

                diesel::insert_into(task_history::table)
                    .values(history_to_new_row(&history))
                    .execute(tx)?;

                Ok(TransitionOutcome { task, history })
            })
        })
        .await
    }

    async fn list_history(&self, id: TaskId) -> TaskRepositoryResult<Vec<TaskHistoryRecord>> {
        self.run_blocking(move |connection| {
            if !task_exists(connection, id).map_err(TaskRepositoryError::persistence)? {
                return Err(TaskRepositoryError::NotFound(id));
            }
            let rows = task_history::table
                .filter(task_history::task_id.eq(id.into_inner()))
                .order(task_history::id.asc())
                .select(TaskHistoryRow::as_select())
                .load::<TaskHistoryRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_history).collect()
        })
        .await
    }
}

#[async_trait]
impl TaskCommentRepository for PostgresTaskRepository {
    async fn add(&self, comment: &TaskComment) -> TaskCommentRepositoryResult<()> {
        let task_id = comment.task_id;
        let new_row = comment_to_new_row(comment);

        self.run_comment_blocking(move |connection| {
            // The pre-check improves the error over a raw foreign-key
            // violation; the constraint still enforces integrity in the
            // window between check and insert.
            if !task_exists(connection, task_id)
                .map_err(TaskCommentRepositoryError::persistence)?
            {
                return Err(TaskCommentRepositoryError::TaskNotFound(task_id));
            }
            diesel::insert_into(task_comments::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        TaskCommentRepositoryError::TaskNotFound(task_id)
                    }
                    _ => TaskCommentRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn list_for_task(
        &self,
        task_id: TaskId,
    ) -> TaskCommentRepositoryResult<Vec<TaskComment>> {
        self.run_comment_blocking(move |connection| {
            if !task_exists(connection, task_id)
                .map_err(TaskCommentRepositoryError::persistence)?
            {
                return Err(TaskCommentRepositoryError::TaskNotFound(task_id));
            }
            let rows = task_comments::table
                .filter(task_comments::task_id.eq(task_id.into_inner()))
                .order(task_comments::id.asc())
                .select(TaskCommentRow::as_select())
                .load::<TaskCommentRow>(connection)
                .map_err(TaskCommentRepositoryError::persistence)?;
            rows.into_iter().map(row_to_comment).collect()
        })
        .await
    }
}

fn task_exists(connection: &mut PgConnection, id: TaskId) -> Result<bool, DieselError> {
    diesel::select(diesel::dsl::exists(
        tasks::table.filter(tasks::id.eq(id.into_inner())),
    ))
    .get_result::<bool>(connection)
}

/// Maps the row-lock acquisition error, distinguishing lock-wait expiry.
///
/// `PostgreSQL` reports SQLSTATE 55P03 (`lock_not_available`) when
/// `lock_timeout` expires; Diesel surfaces it as an unclassified database
/// error, so the server message is matched instead.
fn map_row_lock_error(err: DieselError, id: TaskId) -> TaskRepositoryError {
    match &err {
        DieselError::DatabaseError(_, info)
            if info.message().contains("lock timeout")
                || info.message().contains("could not obtain lock") =>
        {
            TaskRepositoryError::LockTimeout(id)
        }
        _ => TaskRepositoryError::persistence(err),
    }
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().to_owned(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        created_by: task.created_by().into_inner(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let title = TaskTitle::new(row.title).map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let priority =
        TaskPriority::try_from(row.priority.as_str()).map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        title,
        description: row.description,
        priority,
        status,
        created_by: UserId::from_uuid(row.created_by),
        assigned_to: row.assigned_to.map(UserId::from_uuid),
        assigned_by: row.assigned_by.map(UserId::from_uuid),
        closed_by: row.closed_by.map(UserId::from_uuid),
        deleted_by: row.deleted_by.map(UserId::from_uuid),
        created_at: row.created_at,
        updated_at: row.updated_at,
        assigned_at: row.assigned_at,
        closed_at: row.closed_at,
        deleted_at: row.deleted_at,
    };
    Ok(Task::from_persisted(data))
}

fn history_to_new_row(record: &TaskHistoryRecord) -> NewTaskHistoryRow {
    NewTaskHistoryRow {
        task_id: record.task_id.into_inner(),
        changed_at: record.changed_at,
        changed_by: record.changed_by.into_inner(),
        previous_status: record.previous_status.as_str().to_owned(),
        new_status: record.new_status.as_str().to_owned(),
        assigned_to: record.assigned_to.map(UserId::into_inner),
    }
}

fn row_to_history(row: TaskHistoryRow) -> TaskRepositoryResult<TaskHistoryRecord> {
    let previous_status = TaskStatus::try_from(row.previous_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let new_status =
        TaskStatus::try_from(row.new_status.as_str()).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskHistoryRecord::new(
        TaskId::from_uuid(row.task_id),
        row.changed_at,
        UserId::from_uuid(row.changed_by),
        previous_status,
        new_status,
        row.assigned_to.map(UserId::from_uuid),
    ))
}

fn comment_to_new_row(comment: &TaskComment) -> NewTaskCommentRow {
    NewTaskCommentRow {
        task_id: comment.task_id.into_inner(),
        commented_at: comment.commented_at,
        commented_by: comment.commented_by.into_inner(),
        comment: comment.comment.as_str().to_owned(),
    }
}

fn row_to_comment(row: TaskCommentRow) -> TaskCommentRepositoryResult<TaskComment> {
    let comment =
        CommentText::new(row.comment).map_err(TaskCommentRepositoryError::persistence)?;
    Ok(TaskComment {
        task_id: TaskId::from_uuid(row.task_id),
        commented_at: row.commented_at,
        commented_by: UserId::from_uuid(row.commented_by),
        comment,
    })
}
