//! SurrealDB implementation of [`NotificationEndpointRepository`].
//!
//! The endpoint itself is stored as a redacted JSON document next to a
//! few indexed columns. Secret values go to the `secret` table keyed by
//! the field's secret key and are never read back through this
//! repository.

use chrono::{DateTime, Utc};
use strata_core::error::{StrataError, StrataResult};
use strata_core::models::notification_endpoint::{
    NotificationEndpoint, NotificationEndpointFilter, NotificationEndpointUpdate,
};
use strata_core::repository::{NotificationEndpointRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DocumentRow {
    document: String,
}

impl DocumentRow {
    fn into_endpoint(self) -> StrataResult<NotificationEndpoint> {
        let value: serde_json::Value = serde_json::from_str(&self.document)
            .map_err(|e| DbError::Decode(format!("invalid endpoint document: {e}")))?;
        NotificationEndpoint::from_document(value)
    }
}

/// Listing rows carry `created_at` because ORDER BY fields must be selected.
#[derive(Debug, SurrealValue)]
struct ListedDocumentRow {
    document: String,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct OrgIdRow {
    record_id: String,
}

/// SurrealDB implementation of the NotificationEndpoint repository.
#[derive(Clone)]
pub struct SurrealNotificationEndpointRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealNotificationEndpointRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn name_taken(&self, org_id: Uuid, name: &str, except: Uuid) -> Result<bool, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM notification_endpoint \
                 WHERE org_id = $org_id AND name = $name AND meta::id(id) != $except \
                 GROUP ALL",
            )
            .bind(("org_id", org_id.to_string()))
            .bind(("name", name.to_string()))
            .bind(("except", except.to_string()))
            .await?;

        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn resolve_org(&self, name: &str) -> Result<Uuid, DbError> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id FROM organization WHERE name = $name")
            .bind(("name", name.to_string()))
            .await?;

        let rows: Vec<OrgIdRow> = result.take(0)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("organization", format!("name={name}")))?;
        parse_uuid(&row.record_id, "organization")
    }

    async fn store_secrets(&self, endpoint: &NotificationEndpoint) -> Result<(), DbError> {
        let org_id = endpoint.org_id().to_string();
        for field in endpoint.secret_fields() {
            let Some(value) = field.value else {
                continue;
            };
            self.db
                .query(
                    "UPSERT type::record('secret', $key) SET \
                     org_id = $org_id, secret_value = $secret_value, updated_at = time::now()",
                )
                .bind(("key", field.key))
                .bind(("org_id", org_id.clone()))
                .bind(("secret_value", value))
                .await?
                .check()
                .map_err(|e| DbError::Query(e.to_string()))?;
        }
        Ok(())
    }

    async fn delete_secrets(&self, endpoint: &NotificationEndpoint) -> Result<(), DbError> {
        for field in endpoint.secret_fields() {
            self.db
                .query("DELETE type::record('secret', $key)")
                .bind(("key", field.key))
                .await?;
        }
        Ok(())
    }

    fn encode(endpoint: &NotificationEndpoint) -> StrataResult<String> {
        let document = endpoint.to_document()?;
        serde_json::to_string(&document)
            .map_err(|e| StrataError::Internal(format!("serialize endpoint document: {e}")))
    }
}

impl<C: Connection> NotificationEndpointRepository for SurrealNotificationEndpointRepository<C> {
    async fn create(
        &self,
        mut endpoint: NotificationEndpoint,
        user_id: Uuid,
    ) -> StrataResult<NotificationEndpoint> {
        let now = Utc::now();
        let base = endpoint.base_mut();
        base.id = Uuid::new_v4();
        base.created_at = now;
        base.updated_at = now;

        endpoint.backfill_secret_keys();
        endpoint.valid()?;

        let id = endpoint.id();
        let base = endpoint.base();
        if self.name_taken(base.org_id, &base.name, id).await? {
            return Err(DbError::AlreadyExists {
                entity: format!("notification endpoint with name {}", base.name),
            }
            .into());
        }

        self.store_secrets(&endpoint).await?;

        let document = Self::encode(&endpoint)?;
        self.db
            .query(
                "CREATE type::record('notification_endpoint', $id) SET \
                 org_id = $org_id, endpoint_type = $endpoint_type, \
                 name = $name, document = $document, created_by = $created_by",
            )
            .bind(("id", id.to_string()))
            .bind(("org_id", base.org_id.to_string()))
            .bind(("endpoint_type", endpoint.type_tag().to_string()))
            .bind(("name", base.name.clone()))
            .bind(("document", document))
            .bind(("created_by", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        debug!(endpoint_id = %id, kind = endpoint.type_tag(), "Notification endpoint created");

        Ok(endpoint.redacted())
    }

    async fn get_by_id(&self, id: Uuid) -> StrataResult<NotificationEndpoint> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT document FROM type::record('notification_endpoint', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("notification endpoint", id_str))?
            .into_endpoint()
    }

    async fn find(
        &self,
        filter: NotificationEndpointFilter,
        pagination: Pagination,
    ) -> StrataResult<PaginatedResult<NotificationEndpoint>> {
        let org_id = match (&filter.org, filter.org_id) {
            (Some(name), None) => Some(self.resolve_org(name).await?),
            (Some(name), Some(org_id)) => {
                if self.resolve_org(name).await? != org_id {
                    return Err(StrataError::conflict(format!(
                        "organization {name} does not match org id {org_id}"
                    )));
                }
                Some(org_id)
            }
            (None, org_id) => org_id,
        };

        let mut conditions = Vec::new();
        if filter.id.is_some() {
            conditions.push("meta::id(id) = $id");
        }
        if org_id.is_some() {
            conditions.push("org_id = $org_id");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let id = filter.id.map(|id| id.to_string()).unwrap_or_default();
        let org_id = org_id.map(|id| id.to_string()).unwrap_or_default();

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM notification_endpoint{where_clause} GROUP ALL"
            ))
            .bind(("id", id.clone()))
            .bind(("org_id", org_id.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(format!(
                "SELECT document, created_at FROM notification_endpoint{where_clause} \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset"
            ))
            .bind(("id", id))
            .bind(("org_id", org_id))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ListedDocumentRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| DocumentRow { document: row.document }.into_endpoint())
            .collect::<StrataResult<Vec<_>>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn patch(
        &self,
        id: Uuid,
        update: NotificationEndpointUpdate,
    ) -> StrataResult<NotificationEndpoint> {
        let mut endpoint = self.get_by_id(id).await?;
        endpoint.apply_update(&update)?;

        let base = endpoint.base();
        if update.name.is_some() && self.name_taken(base.org_id, &base.name, id).await? {
            return Err(DbError::AlreadyExists {
                entity: format!("notification endpoint with name {}", base.name),
            }
            .into());
        }

        let document = Self::encode(&endpoint)?;
        self.db
            .query(
                "UPDATE type::record('notification_endpoint', $id) SET \
                 name = $name, document = $document, updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("name", base.name.clone()))
            .bind(("document", document))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(endpoint)
    }

    async fn delete(&self, id: Uuid) -> StrataResult<()> {
        let endpoint = self.get_by_id(id).await?;
        self.delete_secrets(&endpoint).await?;

        self.db
            .query("DELETE type::record('notification_endpoint', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
