//! Directory port for resolving assignee identities.

use crate::task::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user directory lookups.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// Read-only view of the user population.
///
/// Registration, login, and token issuance live with the identity provider;
/// the core only needs to know whether an assignee exists.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns `true` when a user with the given identifier exists.
    async fn exists(&self, id: UserId) -> UserDirectoryResult<bool>;
}

/// Failure while consulting the user directory.
#[derive(Debug, Clone, Error)]
#[error("user directory lookup failed: {0}")]
pub struct UserDirectoryError(pub Arc<dyn std::error::Error + Send + Sync>);

impl UserDirectoryError {
    /// Wraps a lookup error.
    #[must_use]
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
