//! Database-specific error types and conversions.

use strata_auth::AuthError;
use strata_core::error::StrataError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed record: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl DbError {
    pub(crate) fn not_found(entity: &str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<DbError> for StrataError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StrataError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => StrataError::AlreadyExists { entity },
            DbError::Auth(e) => e.into(),
            other => StrataError::Database(other.to_string()),
        }
    }
}
