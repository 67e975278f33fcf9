//! Task lifecycle management for Foreman.
//!
//! This module implements the task-tracking core: creating tasks, the four
//! status transitions (assign, unassign, close, delete) with per-task
//! serialization and an append-only history log, plain field edits, and
//! status-independent comments. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
