//! First-run onboarding workflow.
//!
//! `generate` provisions, in order: the user, its password, the
//! organization, the bucket and an authorization carrying operator,
//! org-admin and bucket permissions. It then marks onboarding complete.
//! The steps are not transactional. A failure part way leaves what was
//! already created in place and the flag still reporting "not
//! onboarded", so a retry provisions a fresh set.

use strata_core::error::{StrataError, StrataResult};
use strata_core::models::authorization::CreateAuthorization;
use strata_core::models::bucket::{CreateBucket, retention_from_hours};
use strata_core::models::onboarding::{OnboardingRequest, OnboardingResult};
use strata_core::models::organization::CreateOrganization;
use strata_core::models::user::CreateUser;
use strata_core::repository::{
    AuthorizationRepository, BucketRepository, OnboardingStatusStore, OrganizationRepository,
    UserRepository,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::OnboardingConfig;
use crate::permissions::onboarding_permissions;

/// Orchestrates the first-run setup.
///
/// Generic over repository implementations so that onboarding has no
/// dependency on the database crate.
pub struct OnboardingService<S, U, O, B, A>
where
    S: OnboardingStatusStore,
    U: UserRepository,
    O: OrganizationRepository,
    B: BucketRepository,
    A: AuthorizationRepository,
{
    status_store: S,
    user_repo: U,
    org_repo: O,
    bucket_repo: B,
    auth_repo: A,
    config: OnboardingConfig,
    /// Held for the whole of `generate` when single-flight is enabled.
    in_flight: Option<Mutex<()>>,
}

impl<S, U, O, B, A> OnboardingService<S, U, O, B, A>
where
    S: OnboardingStatusStore,
    U: UserRepository,
    O: OrganizationRepository,
    B: BucketRepository,
    A: AuthorizationRepository,
{
    pub fn new(
        status_store: S,
        user_repo: U,
        org_repo: O,
        bucket_repo: B,
        auth_repo: A,
        config: OnboardingConfig,
    ) -> Self {
        let in_flight = config.single_flight.then(|| Mutex::new(()));
        Self {
            status_store,
            user_repo,
            org_repo,
            bucket_repo,
            auth_repo,
            config,
            in_flight,
        }
    }

    /// True while first-run setup is still allowed.
    pub async fn is_onboarding(&self) -> StrataResult<bool> {
        let complete = self
            .step("check_status", false, self.status_store.is_onboarding_complete())
            .await?;
        Ok(!complete)
    }

    /// Overwrite the onboarding flag.
    pub async fn put_onboarding_status(&self, complete: bool) -> StrataResult<()> {
        self.step(
            "set_status",
            false,
            self.status_store.set_onboarding_complete(complete),
        )
        .await
    }

    /// Run the first-run setup.
    ///
    /// Fails with `Conflict` once onboarding has completed and with
    /// `EmptyValue` for the first blank field (password, username, org,
    /// bucket). Collaborator errors are returned unchanged.
    pub async fn generate(&self, request: OnboardingRequest) -> StrataResult<OnboardingResult> {
        let _guard = match &self.in_flight {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        if !self.is_onboarding().await? {
            return Err(StrataError::conflict("onboarding has already been completed"));
        }

        request.validate()?;
        let retention_period = retention_from_hours(request.retention_period_hours)?;

        info!(
            username = %request.username,
            org = %request.org,
            bucket = %request.bucket,
            "Starting onboarding"
        );

        let user = self
            .step(
                "create_user",
                false,
                self.user_repo.create(CreateUser {
                    name: request.username.clone(),
                }),
            )
            .await?;
        debug!(user_id = %user.id, "Onboarding user created");

        self.step(
            "set_password",
            true,
            self.user_repo.set_password(user.id, &request.password),
        )
        .await?;

        let org = self
            .step(
                "create_organization",
                true,
                self.org_repo.create(CreateOrganization {
                    name: request.org.clone(),
                    description: None,
                }),
            )
            .await?;
        debug!(org_id = %org.id, "Onboarding organization created");

        let bucket = self
            .step(
                "create_bucket",
                true,
                self.bucket_repo.create(CreateBucket {
                    org_id: org.id,
                    organization: org.name.clone(),
                    name: request.bucket.clone(),
                    retention_period,
                }),
            )
            .await?;
        debug!(bucket_id = %bucket.id, "Onboarding bucket created");

        let permissions = onboarding_permissions(org.id, bucket.id).inspect_err(|e| {
            warn!(
                step = "compose_permissions",
                error = %e,
                "Onboarding aborted after partial provisioning"
            );
        })?;

        let (auth, token) = self
            .step(
                "create_authorization",
                true,
                self.auth_repo.create(CreateAuthorization {
                    user_id: user.id,
                    org_id: org.id,
                    description: self.config.token_description_for(&request.username),
                    permissions,
                }),
            )
            .await?;
        debug!(auth_id = %auth.id, "Onboarding authorization created");

        self.step(
            "set_status",
            true,
            self.status_store.set_onboarding_complete(true),
        )
        .await?;

        info!(
            user_id = %user.id,
            org_id = %org.id,
            bucket_id = %bucket.id,
            "Onboarding completed"
        );

        Ok(OnboardingResult {
            user,
            org,
            bucket,
            auth,
            token,
        })
    }

    /// Await one collaborator call under the configured step deadline.
    /// `provisioned` marks steps that run after entities were created.
    async fn step<T>(
        &self,
        step: &'static str,
        provisioned: bool,
        call: impl Future<Output = StrataResult<T>>,
    ) -> StrataResult<T> {
        let result = match self.config.step_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| {
                    Err(StrataError::Timeout {
                        step: step.to_string(),
                    })
                }),
            None => call.await,
        };

        if provisioned && let Err(e) = &result {
            warn!(step, error = %e, "Onboarding aborted after partial provisioning");
        }

        result
    }
}
