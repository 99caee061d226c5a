//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Services are generic over
//! these traits so they carry no dependency on a storage backend.

use uuid::Uuid;

use crate::error::StrataResult;
use crate::models::{
    authorization::{Authorization, CreateAuthorization},
    bucket::{Bucket, CreateBucket},
    notification_endpoint::{
        NotificationEndpoint, NotificationEndpointFilter, NotificationEndpointUpdate,
    },
    organization::{CreateOrganization, Organization},
    status::Status,
    user::{CreateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Onboarding status
// ---------------------------------------------------------------------------

/// Durable record of whether first-run setup has completed.
///
/// Both operations are safe to call concurrently. Nothing makes a read
/// followed by a write atomic.
pub trait OnboardingStatusStore: Send + Sync {
    /// `false` when no flag has been stored yet.
    fn is_onboarding_complete(&self) -> impl Future<Output = StrataResult<bool>> + Send;
    fn set_onboarding_complete(
        &self,
        complete: bool,
    ) -> impl Future<Output = StrataResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Identity & organizations
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the name is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = StrataResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StrataResult<User>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = StrataResult<User>> + Send;
    /// Hash and attach a password, replacing any previous one.
    fn set_password(
        &self,
        id: Uuid,
        password: &str,
    ) -> impl Future<Output = StrataResult<()>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = StrataResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = StrataResult<PaginatedResult<User>>> + Send;
}

pub trait OrganizationRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the name is taken.
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = StrataResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StrataResult<Organization>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = StrataResult<Organization>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = StrataResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = StrataResult<PaginatedResult<Organization>>> + Send;
}

// ---------------------------------------------------------------------------
// Organization-scoped resources
// ---------------------------------------------------------------------------

pub trait BucketRepository: Send + Sync {
    /// Fails with `NotFound` when the organization does not exist and
    /// with `AlreadyExists` when the org already has a bucket of that name.
    fn create(&self, input: CreateBucket) -> impl Future<Output = StrataResult<Bucket>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StrataResult<Bucket>> + Send;
    fn get_by_name(
        &self,
        org_id: Uuid,
        name: &str,
    ) -> impl Future<Output = StrataResult<Bucket>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = StrataResult<()>> + Send;
    fn list_by_organization(
        &self,
        org_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = StrataResult<PaginatedResult<Bucket>>> + Send;
}

pub trait AuthorizationRepository: Send + Sync {
    /// Issue an authorization; returns it with the raw token.
    fn create(
        &self,
        input: CreateAuthorization,
    ) -> impl Future<Output = StrataResult<(Authorization, String)>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = StrataResult<Authorization>> + Send;
    /// Look up an authorization by its raw token.
    fn get_by_token(
        &self,
        raw_token: &str,
    ) -> impl Future<Output = StrataResult<Authorization>> + Send;
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = StrataResult<Vec<Authorization>>> + Send;
    fn set_status(
        &self,
        id: Uuid,
        status: Status,
    ) -> impl Future<Output = StrataResult<Authorization>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = StrataResult<()>> + Send;
}

pub trait NotificationEndpointRepository: Send + Sync {
    /// Assign an id and timestamps, validate, store secrets separately
    /// and persist the redacted document. `user_id` is recorded as the
    /// creator.
    fn create(
        &self,
        endpoint: NotificationEndpoint,
        user_id: Uuid,
    ) -> impl Future<Output = StrataResult<NotificationEndpoint>> + Send;
    fn get_by_id(&self, id: Uuid)
    -> impl Future<Output = StrataResult<NotificationEndpoint>> + Send;
    /// Matching endpoints ordered by creation time, plus the total count.
    fn find(
        &self,
        filter: NotificationEndpointFilter,
        pagination: Pagination,
    ) -> impl Future<Output = StrataResult<PaginatedResult<NotificationEndpoint>>> + Send;
    fn patch(
        &self,
        id: Uuid,
        update: NotificationEndpointUpdate,
    ) -> impl Future<Output = StrataResult<NotificationEndpoint>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = StrataResult<()>> + Send;
}
