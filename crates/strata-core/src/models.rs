//! Domain models for Strata.
//!
//! These are the core types shared across all crates.

pub mod authorization;
pub mod bucket;
pub mod notification_endpoint;
pub mod onboarding;
pub mod organization;
pub mod permission;
pub mod status;
pub mod user;
