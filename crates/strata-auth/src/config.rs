//! Authentication configuration.

/// Configuration for credential hashing and checking.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Optional pepper prepended to passwords before Argon2id hashing
    /// and verification. Must match the pepper the user repository
    /// hashed with.
    pub pepper: Option<String>,
}
