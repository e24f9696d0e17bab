pub mod auth;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod salt;

use crate::error::HookError;
use crate::salt::StateRunner;
use std::sync::Arc;

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct HookConfig {
    /// Shared secret for GitHub signature and GitLab token validation.
    /// Empty means the sender is not expected to authenticate.
    pub secret: String,
    /// Salt state applied for every accepted webhook.
    pub salt_state: String,
    /// Accept requests that carry neither auth header.
    pub allow_unsigned: bool,
}

impl HookConfig {
    /// Reads configuration from the environment. `SALT_STATE` is required,
    /// everything else has a default.
    pub fn from_env() -> Result<Self, HookError> {
        let salt_state = std::env::var("SALT_STATE").unwrap_or_default();
        if salt_state.is_empty() {
            return Err(HookError::ConfigError(
                "SALT_STATE environment variable is not set".to_string(),
            ));
        }

        let secret = std::env::var("GITHOOK_SECRET").unwrap_or_default();
        let allow_unsigned = std::env::var("GITHOOK_ALLOW_UNSIGNED")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Ok(Self {
            secret,
            salt_state,
            allow_unsigned,
        })
    }

    /// Returns true if a non-empty shared secret is configured.
    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }
}

/// Parses a boolean environment flag. Anything other than an explicit
/// "true"/"1"/"yes" counts as false.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

pub struct AppState {
    pub config: HookConfig,
    pub runner: Arc<dyn StateRunner>,
}

pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag_accepts_truthy_spellings() {
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(parse_flag("yes"));
        assert!(parse_flag(" true "));
    }

    #[test]
    fn parse_flag_rejects_everything_else() {
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("on"));
    }
}
