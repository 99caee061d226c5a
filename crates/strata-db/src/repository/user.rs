//! SurrealDB implementation of [`UserRepository`].
//!
//! Users are created without a password; `set_password` hashes with
//! Argon2id (see `strata_auth::password`) using the optional pepper
//! given at construction time.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use strata_auth::password::hash_password;
use strata_core::error::StrataResult;
use strata_core::models::status::Status;
use strata_core::models::user::{CreateUser, User};
use strata_core::repository::{PaginatedResult, Pagination, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    name: String,
    password_hash: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    name: String,
    password_hash: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<Status, DbError> {
    Status::from_str(s).map_err(|_| DbError::Decode(format!("unknown user status: {s}")))
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            name: self.name,
            password_hash: self.password_hash,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = parse_uuid(&self.record_id, "user")?;
        UserRow {
            name: self.name,
            password_hash: self.password_hash,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_user(id)
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            pepper: Some(pepper),
        }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, DbError> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user WHERE name = $name")
            .bind(("name", name.to_string()))
            .await?;

        let rows: Vec<UserRowWithId> = result.take(0)?;
        rows.into_iter().next().map(|r| r.try_into_user()).transpose()
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> StrataResult<User> {
        if self.find_by_name(&input.name).await?.is_some() {
            return Err(DbError::AlreadyExists {
                entity: format!("user with name {}", input.name),
            }
            .into());
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 name = $name, password_hash = NONE, status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("status", Status::Active.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id_str))?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> StrataResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id_str))?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_name(&self, name: &str) -> StrataResult<User> {
        self.find_by_name(name)
            .await?
            .ok_or_else(|| DbError::not_found("user", format!("name={name}")).into())
    }

    async fn set_password(&self, id: Uuid, password: &str) -> StrataResult<()> {
        let id_str = id.to_string();
        let password_hash = hash_password(password, self.pepper.as_deref()).map_err(DbError::from)?;

        let result = self
            .db
            .query(
                "UPDATE type::record('user', $id) SET \
                 password_hash = $password_hash, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        // UPDATE on a missing record id returns no rows.
        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::not_found("user", id_str).into());
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StrataResult<()> {
        self.db
            .query("DELETE type::record('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> StrataResult<PaginatedResult<User>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
