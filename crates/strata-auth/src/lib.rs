//! Strata Auth: password hashing, opaque token issuance, and
//! credential checks.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::CredentialService;
