//! Credential checks against stored users and authorizations.

use strata_core::error::{StrataError, StrataResult};
use strata_core::models::authorization::Authorization;
use strata_core::models::status::Status;
use strata_core::models::user::User;
use strata_core::repository::{AuthorizationRepository, UserRepository};
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;

/// Checks passwords and access tokens.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct CredentialService<U: UserRepository, A: AuthorizationRepository> {
    user_repo: U,
    auth_repo: A,
    config: AuthConfig,
}

impl<U: UserRepository, A: AuthorizationRepository> CredentialService<U, A> {
    pub fn new(user_repo: U, auth_repo: A, config: AuthConfig) -> Self {
        Self {
            user_repo,
            auth_repo,
            config,
        }
    }

    /// Verify a username/password pair and return the user.
    ///
    /// Unknown users and wrong passwords both fail with
    /// `InvalidCredentials`.
    pub async fn check_password(&self, name: &str, password: &str) -> StrataResult<User> {
        let user = match self.user_repo.get_by_name(name).await {
            Ok(u) => u,
            Err(StrataError::NotFound { .. }) => return Err(AuthError::InvalidCredentials.into()),
            Err(e) => return Err(e),
        };

        let Some(hash) = user.password_hash.as_deref() else {
            debug!(user_id = %user.id, "password check for passwordless user");
            return Err(AuthError::PasswordNotSet.into());
        };

        if !password::verify_password(password, hash, self.config.pepper.as_deref())? {
            return Err(AuthError::InvalidCredentials.into());
        }

        if user.status != Status::Active {
            return Err(AuthError::UserInactive.into());
        }

        Ok(user)
    }

    /// Resolve a raw access token to its active authorization.
    pub async fn authenticate_token(&self, raw_token: &str) -> StrataResult<Authorization> {
        let auth = self
            .auth_repo
            .get_by_token(raw_token)
            .await
            .map_err(|e| match e {
                StrataError::NotFound { .. } => AuthError::TokenInvalid.into(),
                other => other,
            })?;

        if !auth.is_active() {
            return Err(AuthError::AuthorizationInactive.into());
        }

        Ok(auth)
    }
}
