//! Authorization domain model.
//!
//! An authorization is an issued access token bound to a user and an
//! organization, carrying an ordered list of permissions. The raw token
//! is only returned once, at creation; the store keeps its hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::Permission;
use super::status::Status;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authorization {
    pub id: Uuid,
    pub user_id: Uuid,
    pub org_id: Uuid,
    pub description: String,
    pub status: Status,
    /// Ordered as issued; never modified after creation.
    pub permissions: Vec<Permission>,
    /// SHA-256 hex digest of the raw token.
    #[serde(skip_serializing, default)]
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Authorization {
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }
}

/// Fields required to issue a new authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthorization {
    pub user_id: Uuid,
    pub org_id: Uuid,
    pub description: String,
    pub permissions: Vec<Permission>,
}
