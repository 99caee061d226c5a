//! Onboarding request and result.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::authorization::Authorization;
use super::bucket::Bucket;
use super::organization::Organization;
use super::user::User;
use crate::error::{StrataError, StrataResult};

/// Parameters for the first-run setup.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct OnboardingRequest {
    pub username: String,
    pub password: String,
    pub org: String,
    pub bucket: String,
    /// Retention of the default bucket in hours; 0 keeps data forever.
    #[serde(default)]
    pub retention_period_hours: u64,
}

impl OnboardingRequest {
    /// Reject the first blank field, checked in the order password,
    /// username, org, bucket.
    pub fn validate(&self) -> StrataResult<()> {
        if self.password.is_empty() {
            return Err(StrataError::empty_value("password is empty"));
        }
        if self.username.is_empty() {
            return Err(StrataError::empty_value("username is empty"));
        }
        if self.org.is_empty() {
            return Err(StrataError::empty_value("org name is empty"));
        }
        if self.bucket.is_empty() {
            return Err(StrataError::empty_value("bucket name is empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for OnboardingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnboardingRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .field("retention_period_hours", &self.retention_period_hours)
            .finish()
    }
}

/// Everything created by a successful onboarding.
#[derive(Clone, Serialize)]
pub struct OnboardingResult {
    pub user: User,
    pub org: Organization,
    pub bucket: Bucket,
    pub auth: Authorization,
    /// Raw token of `auth`. Not recoverable later.
    pub token: String,
}

impl fmt::Debug for OnboardingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnboardingResult")
            .field("user", &self.user)
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .field("auth", &self.auth)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> OnboardingRequest {
        OnboardingRequest {
            username: "admin".into(),
            password: "pw123".into(),
            org: "acme".into(),
            bucket: "default".into(),
            retention_period_hours: 0,
        }
    }

    fn message(req: &OnboardingRequest) -> String {
        match req.validate().unwrap_err() {
            StrataError::EmptyValue { message } => message,
            other => panic!("expected EmptyValue, got {other:?}"),
        }
    }

    #[test]
    fn complete_request_passes() {
        assert!(full().validate().is_ok());
    }

    #[test]
    fn password_is_checked_first() {
        let req = OnboardingRequest::default();
        assert_eq!(message(&req), "password is empty");
    }

    #[test]
    fn fields_are_checked_in_order() {
        let mut req = full();
        req.username.clear();
        req.org.clear();
        assert_eq!(message(&req), "username is empty");

        let mut req = full();
        req.org.clear();
        req.bucket.clear();
        assert_eq!(message(&req), "org name is empty");

        let mut req = full();
        req.bucket.clear();
        assert_eq!(message(&req), "bucket name is empty");
    }

    #[test]
    fn retention_defaults_to_zero() {
        let req: OnboardingRequest = serde_json::from_value(serde_json::json!({
            "username": "admin",
            "password": "pw",
            "org": "acme",
            "bucket": "default"
        }))
        .unwrap();
        assert_eq!(req.retention_period_hours, 0);
    }

    #[test]
    fn debug_output_hides_password() {
        let req = OnboardingRequest {
            password: "hunter2-secret".into(),
            ..full()
        };
        let rendered = format!("{req:?}");
        assert!(rendered.contains("admin"));
        assert!(rendered.contains("default"));
        assert!(!rendered.contains("hunter2-secret"));
    }
}
