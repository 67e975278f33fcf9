//! `PostgreSQL` user directory implementation.

use super::{
    blocking::{TaskPgPool, get_conn_with, run_blocking_with},
    schema::users,
};
use crate::task::{
    domain::UserId,
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;

/// `PostgreSQL`-backed read-only user directory.
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: TaskPgPool,
}

impl PostgresUserDirectory {
    /// Creates a new directory from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn exists(&self, id: UserId) -> UserDirectoryResult<bool> {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection = get_conn_with(&pool, UserDirectoryError::new)?;
                diesel::select(diesel::dsl::exists(
                    users::table.filter(users::id.eq(id.into_inner())),
                ))
                .get_result::<bool>(&mut connection)
                .map_err(UserDirectoryError::new)
            },
            UserDirectoryError::new,
        )
        .await
    }
}
