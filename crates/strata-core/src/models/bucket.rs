//! Bucket domain model.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StrataError, StrataResult};

const SECONDS_PER_HOUR: u64 = 3600;

/// A named, retention-bounded container of time-ordered data.
///
/// A zero retention period means data is kept forever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    pub id: Uuid,
    /// The organization this bucket belongs to.
    pub org_id: Uuid,
    /// Name of the owning organization at creation time.
    pub organization: String,
    /// Unique within the owning organization.
    pub name: String,
    pub retention_period: Duration,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBucket {
    pub org_id: Uuid,
    pub organization: String,
    pub name: String,
    pub retention_period: Duration,
}

/// Convert a retention period given in hours.
///
/// Retention is stored as signed 64-bit seconds, so anything above
/// `i64::MAX` seconds is rejected.
pub fn retention_from_hours(hours: u64) -> StrataResult<Duration> {
    hours
        .checked_mul(SECONDS_PER_HOUR)
        .filter(|secs| i64::try_from(*secs).is_ok())
        .map(Duration::from_secs)
        .ok_or_else(|| StrataError::invalid("retention period is too large"))
}
