//! Command-line arguments.

use std::fmt;
use std::time::Duration;

use clap::{Parser, Subcommand};
use strata_auth::AuthConfig;
use strata_core::models::onboarding::OnboardingRequest;
use strata_db::{DbConfig, RootCredentials};
use strata_onboarding::OnboardingConfig;

/// Strata server - first-run setup and status.
#[derive(Parser)]
#[command(name = "strata-server", about = "Strata server", version)]
pub struct Args {
    /// Store endpoint, `ws://host:port` or `mem://`.
    #[arg(long, env = "STRATA_DB_URL", default_value = "ws://127.0.0.1:8000")]
    pub db_url: String,

    #[arg(long, env = "STRATA_DB_NAMESPACE", default_value = "strata")]
    pub db_namespace: String,

    #[arg(long, env = "STRATA_DB_DATABASE", default_value = "main")]
    pub db_database: String,

    /// Root user. Sign-in happens only when both user and password are set.
    #[arg(long, env = "STRATA_DB_USER")]
    pub db_user: Option<String>,

    #[arg(long, env = "STRATA_DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Prepended to passwords before hashing.
    #[arg(long, env = "STRATA_PASSWORD_PEPPER", hide_env_values = true)]
    pub password_pepper: Option<String>,

    /// Deadline in seconds for each onboarding step.
    #[arg(long, env = "STRATA_ONBOARDING_STEP_TIMEOUT_SECS")]
    pub step_timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Report whether first-run setup is still allowed
    Status,
    /// Create the first user, organization, bucket and token
    Setup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        org: String,
        #[arg(long)]
        bucket: String,
        /// Bucket retention in hours, 0 keeps data forever.
        #[arg(long, default_value_t = 0)]
        retention_hours: u64,
    },
}

impl Args {
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_database.clone(),
            credentials: self
                .db_user
                .clone()
                .zip(self.db_password.clone())
                .map(|(username, password)| RootCredentials { username, password }),
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            pepper: self.password_pepper.clone(),
        }
    }

    pub fn onboarding_config(&self) -> OnboardingConfig {
        OnboardingConfig {
            step_timeout: self.step_timeout_secs.map(Duration::from_secs),
            ..Default::default()
        }
    }
}

fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("db_url", &self.db_url)
            .field("db_namespace", &self.db_namespace)
            .field("db_database", &self.db_database)
            .field("db_user", &self.db_user)
            .field("db_password", &redact(&self.db_password))
            .field("password_pepper", &redact(&self.password_pepper))
            .field("step_timeout_secs", &self.step_timeout_secs)
            .field("command", &self.command)
            .finish()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status => f.write_str("Status"),
            Self::Setup {
                username,
                password: _,
                org,
                bucket,
                retention_hours,
            } => f
                .debug_struct("Setup")
                .field("username", username)
                .field("password", &"<redacted>")
                .field("org", org)
                .field("bucket", bucket)
                .field("retention_hours", retention_hours)
                .finish(),
        }
    }
}

impl Command {
    pub fn onboarding_request(&self) -> Option<OnboardingRequest> {
        match self {
            Self::Status => None,
            Self::Setup {
                username,
                password,
                org,
                bucket,
                retention_hours,
            } => Some(OnboardingRequest {
                username: username.clone(),
                password: password.clone(),
                org: org.clone(),
                bucket: bucket.clone(),
                retention_period_hours: *retention_hours,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_arguments_build_a_request() {
        let args = Args::try_parse_from([
            "strata-server",
            "--step-timeout-secs",
            "5",
            "setup",
            "--username",
            "admin",
            "--password",
            "pw123",
            "--org",
            "acme",
            "--bucket",
            "default",
            "--retention-hours",
            "24",
        ])
        .unwrap();

        let request = args.command.onboarding_request().unwrap();
        assert_eq!(request.username, "admin");
        assert_eq!(request.org, "acme");
        assert_eq!(request.retention_period_hours, 24);
        assert_eq!(
            args.onboarding_config().step_timeout,
            Some(Duration::from_secs(5))
        );
        assert!(args.onboarding_config().single_flight);
    }

    #[test]
    fn status_has_no_request() {
        let args = Args::try_parse_from(["strata-server", "status"]).unwrap();
        assert!(args.command.onboarding_request().is_none());
        assert_eq!(args.db_config().namespace, "strata");
        assert!(args.db_config().credentials.is_none());
    }

    #[test]
    fn root_credentials_need_user_and_password() {
        let args = Args::try_parse_from([
            "strata-server",
            "--db-user",
            "root",
            "--db-password",
            "rootpw",
            "status",
        ])
        .unwrap();
        let credentials = args.db_config().credentials.unwrap();
        assert_eq!(credentials.username, "root");
        assert_eq!(credentials.password, "rootpw");

        let args =
            Args::try_parse_from(["strata-server", "--db-user", "root", "status"]).unwrap();
        assert!(args.db_config().credentials.is_none());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let args = Args::try_parse_from([
            "strata-server",
            "--db-user",
            "root",
            "--db-password",
            "db-secret-1",
            "--password-pepper",
            "pepper-secret-2",
            "setup",
            "--username",
            "admin",
            "--password",
            "user-secret-3",
            "--org",
            "acme",
            "--bucket",
            "default",
        ])
        .unwrap();

        let rendered = format!("{args:?}");
        assert!(rendered.contains("admin"));
        assert!(rendered.contains("acme"));
        for secret in ["db-secret-1", "pepper-secret-2", "user-secret-3"] {
            assert!(!rendered.contains(secret), "{secret} leaked into {rendered}");
        }
    }
}
