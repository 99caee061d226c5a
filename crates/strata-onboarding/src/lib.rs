//! Strata Onboarding: the one-time first-run setup that provisions
//! the initial user, organization, bucket and all-access token.

pub mod config;
pub mod permissions;
pub mod service;

pub use config::OnboardingConfig;
pub use service::OnboardingService;
