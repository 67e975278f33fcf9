//! `PostgreSQL` adapter implementations of the task ports.

mod blocking;
mod models;
mod repository;
pub mod schema;
mod users;

pub use blocking::TaskPgPool;
pub use repository::PostgresTaskRepository;
pub use users::PostgresUserDirectory;
