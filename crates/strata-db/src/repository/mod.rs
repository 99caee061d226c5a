//! SurrealDB repository implementations.

mod authorization;
mod bucket;
mod notification_endpoint;
mod onboarding;
mod organization;
mod user;

pub use authorization::SurrealAuthorizationRepository;
pub use bucket::SurrealBucketRepository;
pub use notification_endpoint::SurrealNotificationEndpointRepository;
pub use onboarding::{ONBOARDING_KEY, SurrealOnboardingStatusStore};
pub use organization::SurrealOrganizationRepository;
pub use user::SurrealUserRepository;

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}
