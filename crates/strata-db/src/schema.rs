//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings, enums as strings with ASSERT constraints. Structured values
//! that are only ever read back whole (permission lists, endpoint
//! documents) are stored as JSON strings.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Onboarding status (single well-known record)
-- =======================================================================
DEFINE TABLE onboarding SCHEMAFULL;
DEFINE FIELD completed ON TABLE onboarding TYPE bool DEFAULT false;
DEFINE FIELD updated_at ON TABLE onboarding TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE option<string>;
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['active', 'inactive'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_name ON TABLE user COLUMNS name UNIQUE;

-- =======================================================================
-- Organizations
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD description ON TABLE organization TYPE string DEFAULT '';
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_name ON TABLE organization \
    COLUMNS name UNIQUE;

-- =======================================================================
-- Buckets (organization scope)
-- =======================================================================
DEFINE TABLE bucket SCHEMAFULL;
DEFINE FIELD org_id ON TABLE bucket TYPE string;
DEFINE FIELD organization ON TABLE bucket TYPE string;
DEFINE FIELD name ON TABLE bucket TYPE string;
DEFINE FIELD retention_period_secs ON TABLE bucket TYPE int \
    ASSERT $value >= 0;
DEFINE FIELD created_at ON TABLE bucket TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE bucket TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_bucket_org_name ON TABLE bucket \
    COLUMNS org_id, name UNIQUE;

-- =======================================================================
-- Authorizations (organization scope)
-- =======================================================================
DEFINE TABLE authorization SCHEMAFULL;
DEFINE FIELD user_id ON TABLE authorization TYPE string;
DEFINE FIELD org_id ON TABLE authorization TYPE string;
DEFINE FIELD description ON TABLE authorization TYPE string;
DEFINE FIELD status ON TABLE authorization TYPE string \
    ASSERT $value IN ['active', 'inactive'];
DEFINE FIELD permissions ON TABLE authorization TYPE string;
DEFINE FIELD token_hash ON TABLE authorization TYPE string;
DEFINE FIELD created_at ON TABLE authorization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE authorization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_authorization_token ON TABLE authorization \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_authorization_user ON TABLE authorization \
    COLUMNS user_id;

-- =======================================================================
-- Notification endpoints (organization scope)
-- =======================================================================
DEFINE TABLE notification_endpoint SCHEMAFULL;
DEFINE FIELD org_id ON TABLE notification_endpoint TYPE string;
DEFINE FIELD endpoint_type ON TABLE notification_endpoint TYPE string \
    ASSERT $value IN ['slack', 'pagerduty', 'http'];
DEFINE FIELD name ON TABLE notification_endpoint TYPE string;
DEFINE FIELD document ON TABLE notification_endpoint TYPE string;
DEFINE FIELD created_by ON TABLE notification_endpoint TYPE string;
DEFINE FIELD created_at ON TABLE notification_endpoint TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE notification_endpoint TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_endpoint_org_name ON TABLE notification_endpoint \
    COLUMNS org_id, name UNIQUE;

-- =======================================================================
-- Secrets (organization scope, values never leave this table)
-- =======================================================================
DEFINE TABLE secret SCHEMAFULL;
DEFINE FIELD org_id ON TABLE secret TYPE string;
DEFINE FIELD secret_value ON TABLE secret TYPE string;
DEFINE FIELD updated_at ON TABLE secret TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_secret_org ON TABLE secret COLUMNS org_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn schema_defines_every_table() {
        for table in [
            "onboarding",
            "user",
            "organization",
            "bucket",
            "authorization",
            "notification_endpoint",
            "secret",
        ] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }
}
