//! Strata Database: SurrealDB connection management, schema
//! migrations, and repository implementations for the `strata-core`
//! traits.
//!
//! This crate provides:
//! - Opening a migrated store ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Repositories ([`repository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager, RootCredentials};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
