//! In-memory user directory for tests and embedding.

use async_trait::async_trait;
use std::collections::HashSet;
use std::io;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::UserId,
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};

/// Thread-safe in-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashSet<UserId>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user to the directory.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError`] when the directory state is poisoned.
    pub fn insert(&self, id: UserId) -> UserDirectoryResult<()> {
        let mut users = self
            .users
            .write()
            .map_err(|err| UserDirectoryError::new(io::Error::other(err.to_string())))?;
        users.insert(id);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn exists(&self, id: UserId) -> UserDirectoryResult<bool> {
        let users = self
            .users
            .read()
            .map_err(|err| UserDirectoryError::new(io::Error::other(err.to_string())))?;
        Ok(users.contains(&id))
    }
}
