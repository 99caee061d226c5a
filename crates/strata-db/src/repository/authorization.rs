//! SurrealDB implementation of [`AuthorizationRepository`].
//!
//! Only the SHA-256 hash of each token is stored. The ordered
//! permission list is kept as a JSON string so it round-trips exactly.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use strata_auth::token;
use strata_core::error::StrataResult;
use strata_core::models::authorization::{Authorization, CreateAuthorization};
use strata_core::models::permission::Permission;
use strata_core::models::status::Status;
use strata_core::repository::AuthorizationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AuthorizationRow {
    user_id: String,
    org_id: String,
    description: String,
    status: String,
    permissions: String,
    token_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AuthorizationRow {
    fn into_authorization(self, id: Uuid) -> Result<Authorization, DbError> {
        let permissions: Vec<Permission> = serde_json::from_str(&self.permissions)
            .map_err(|e| DbError::Decode(format!("invalid permissions: {e}")))?;
        let status = Status::from_str(&self.status).map_err(|_| {
            DbError::Decode(format!("unknown authorization status: {}", self.status))
        })?;

        Ok(Authorization {
            id,
            user_id: parse_uuid(&self.user_id, "user")?,
            org_id: parse_uuid(&self.org_id, "organization")?,
            description: self.description,
            status,
            permissions,
            token_hash: self.token_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AuthorizationRowWithId {
    record_id: String,
    user_id: String,
    org_id: String,
    description: String,
    status: String,
    permissions: String,
    token_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AuthorizationRowWithId {
    fn try_into_authorization(self) -> Result<Authorization, DbError> {
        let id = parse_uuid(&self.record_id, "authorization")?;
        AuthorizationRow {
            user_id: self.user_id,
            org_id: self.org_id,
            description: self.description,
            status: self.status,
            permissions: self.permissions,
            token_hash: self.token_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_authorization(id)
    }
}

/// SurrealDB implementation of the Authorization repository.
#[derive(Clone)]
pub struct SurrealAuthorizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuthorizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuthorizationRepository for SurrealAuthorizationRepository<C> {
    async fn create(&self, input: CreateAuthorization) -> StrataResult<(Authorization, String)> {
        for permission in &input.permissions {
            permission.valid()?;
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let raw_token = token::generate_token();
        let permissions = serde_json::to_string(&input.permissions)
            .map_err(|e| DbError::Decode(format!("serialize permissions: {e}")))?;

        let result = self
            .db
            .query(
                "CREATE type::record('authorization', $id) SET \
                 user_id = $user_id, org_id = $org_id, \
                 description = $description, status = $status, \
                 permissions = $permissions, token_hash = $token_hash",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("org_id", input.org_id.to_string()))
            .bind(("description", input.description))
            .bind(("status", Status::Active.as_str().to_string()))
            .bind(("permissions", permissions))
            .bind(("token_hash", token::hash_token(&raw_token)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<AuthorizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("authorization", id_str))?;

        Ok((row.into_authorization(id)?, raw_token))
    }

    async fn get_by_id(&self, id: Uuid) -> StrataResult<Authorization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('authorization', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuthorizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("authorization", id_str))?;

        Ok(row.into_authorization(id)?)
    }

    async fn get_by_token(&self, raw_token: &str) -> StrataResult<Authorization> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM authorization \
                 WHERE token_hash = $token_hash",
            )
            .bind(("token_hash", token::hash_token(raw_token)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuthorizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("authorization", "token"))?;

        Ok(row.try_into_authorization()?)
    }

    async fn list_by_user(&self, user_id: Uuid) -> StrataResult<Vec<Authorization>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM authorization \
                 WHERE user_id = $user_id ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuthorizationRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_authorization())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn set_status(&self, id: Uuid, status: Status) -> StrataResult<Authorization> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('authorization', $id) SET \
                 status = $status, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<AuthorizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("authorization", id_str))?;

        Ok(row.into_authorization(id)?)
    }

    async fn delete(&self, id: Uuid) -> StrataResult<()> {
        self.db
            .query("DELETE type::record('authorization', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
