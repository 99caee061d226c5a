//! SurrealDB implementation of [`BucketRepository`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use strata_core::error::{StrataError, StrataResult};
use strata_core::models::bucket::{Bucket, CreateBucket};
use strata_core::repository::{BucketRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct BucketRow {
    org_id: String,
    organization: String,
    name: String,
    retention_period_secs: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BucketRow {
    fn into_bucket(self, id: Uuid) -> Result<Bucket, DbError> {
        let retention_secs = u64::try_from(self.retention_period_secs).map_err(|_| {
            DbError::Decode(format!(
                "negative retention period: {}",
                self.retention_period_secs
            ))
        })?;
        Ok(Bucket {
            id,
            org_id: parse_uuid(&self.org_id, "organization")?,
            organization: self.organization,
            name: self.name,
            retention_period: Duration::from_secs(retention_secs),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct BucketRowWithId {
    record_id: String,
    org_id: String,
    organization: String,
    name: String,
    retention_period_secs: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BucketRowWithId {
    fn try_into_bucket(self) -> Result<Bucket, DbError> {
        let id = parse_uuid(&self.record_id, "bucket")?;
        BucketRow {
            org_id: self.org_id,
            organization: self.organization,
            name: self.name,
            retention_period_secs: self.retention_period_secs,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_bucket(id)
    }
}

#[derive(Debug, SurrealValue)]
struct ExistsRow {
    #[allow(dead_code)]
    name: String,
}

/// SurrealDB implementation of the Bucket repository.
#[derive(Clone)]
pub struct SurrealBucketRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealBucketRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_by_name(&self, org_id: Uuid, name: &str) -> Result<Option<Bucket>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM bucket \
                 WHERE org_id = $org_id AND name = $name",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("name", name.to_string()))
            .await?;

        let rows: Vec<BucketRowWithId> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|r| r.try_into_bucket())
            .transpose()
    }

    async fn organization_exists(&self, org_id: Uuid) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query("SELECT name FROM type::record('organization', $id)")
            .bind(("id", org_id.to_string()))
            .await?;

        let rows: Vec<ExistsRow> = result.take(0)?;
        Ok(!rows.is_empty())
    }
}

impl<C: Connection> BucketRepository for SurrealBucketRepository<C> {
    async fn create(&self, input: CreateBucket) -> StrataResult<Bucket> {
        let retention_secs = i64::try_from(input.retention_period.as_secs())
            .map_err(|_| StrataError::invalid("retention period is too large"))?;
        if !self.organization_exists(input.org_id).await? {
            return Err(DbError::not_found("organization", input.org_id.to_string()).into());
        }
        if self.find_by_name(input.org_id, &input.name).await?.is_some() {
            return Err(DbError::AlreadyExists {
                entity: format!("bucket with name {}", input.name),
            }
            .into());
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('bucket', $id) SET \
                 org_id = $org_id, organization = $organization, \
                 name = $name, retention_period_secs = $retention_period_secs",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_id", input.org_id.to_string()))
            .bind(("organization", input.organization))
            .bind(("name", input.name))
            .bind(("retention_period_secs", retention_secs))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<BucketRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("bucket", id_str))?;

        Ok(row.into_bucket(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> StrataResult<Bucket> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('bucket', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BucketRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("bucket", id_str))?;

        Ok(row.into_bucket(id)?)
    }

    async fn get_by_name(&self, org_id: Uuid, name: &str) -> StrataResult<Bucket> {
        self.find_by_name(org_id, name)
            .await?
            .ok_or_else(|| DbError::not_found("bucket", format!("name={name}")).into())
    }

    async fn delete(&self, id: Uuid) -> StrataResult<()> {
        self.db
            .query("DELETE type::record('bucket', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_organization(
        &self,
        org_id: Uuid,
        pagination: Pagination,
    ) -> StrataResult<PaginatedResult<Bucket>> {
        let org_id_str = org_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM bucket \
                 WHERE org_id = $org_id GROUP ALL",
            )
            .bind(("org_id", org_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM bucket \
                 WHERE org_id = $org_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("org_id", org_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<BucketRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_bucket())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
