//! Onboarding configuration.

use std::time::Duration;

/// Placeholder replaced with the new user's name in the token description.
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// Configuration for the onboarding service.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Deadline for each collaborator call. `None` waits indefinitely.
    pub step_timeout: Option<Duration>,
    /// Serialize concurrent `generate` calls on one service instance
    /// (default: true).
    pub single_flight: bool,
    /// Description of the issued authorization (default: `"{username}'s Token"`).
    pub token_description: String,
}

impl OnboardingConfig {
    pub fn token_description_for(&self, username: &str) -> String {
        self.token_description.replace(USERNAME_PLACEHOLDER, username)
    }
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            step_timeout: None,
            single_flight: true,
            token_description: format!("{USERNAME_PLACEHOLDER}'s Token"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_description_names_the_user() {
        let config = OnboardingConfig::default();
        assert_eq!(config.token_description_for("admin"), "admin's Token");
        assert!(config.single_flight);
        assert!(config.step_timeout.is_none());
    }
}
