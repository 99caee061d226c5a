//! Authentication error types.

use strata_core::error::StrataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user has no password set")]
    PasswordNotSet,

    #[error("user is inactive")]
    UserInactive,

    #[error("authorization is inactive")]
    AuthorizationInactive,

    #[error("invalid token")]
    TokenInvalid,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for StrataError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::PasswordNotSet
            | AuthError::UserInactive
            | AuthError::AuthorizationInactive
            | AuthError::TokenInvalid => StrataError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => StrataError::Crypto(msg),
        }
    }
}
