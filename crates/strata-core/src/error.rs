//! Error types for the Strata platform.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrataError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// The requested operation clashes with current platform state.
    #[error("{message}")]
    Conflict { message: String },

    /// A required input field was blank.
    #[error("{message}")]
    EmptyValue { message: String },

    #[error("Invalid input: {message}")]
    Invalid { message: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Notification delivery failed: {0}")]
    NotificationDelivery(String),

    #[error("Step timed out: {step}")]
    Timeout { step: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StrataError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn empty_value(message: impl Into<String>) -> Self {
        Self::EmptyValue {
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Stable, transport-neutral code for this error.
    ///
    /// Calling layers (HTTP, CLI) map these onto their own status
    /// representation.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not found",
            Self::AlreadyExists { .. } | Self::Conflict { .. } => "conflict",
            Self::EmptyValue { .. } => "empty value",
            Self::Invalid { .. } => "invalid",
            Self::AuthenticationFailed { .. } => "unauthorized",
            Self::Timeout { .. } => "timeout",
            Self::Database(_)
            | Self::Crypto(_)
            | Self::NotificationDelivery(_)
            | Self::Internal(_) => "internal error",
        }
    }
}

pub type StrataResult<T> = Result<T, StrataError>;
