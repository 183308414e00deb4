//! Authentication configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Token signing and session lifetime settings.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// access_token_secret = "change-me"
/// refresh_token_secret = "change-me-too"
/// access_token_lifetime = "15m"
/// refresh_token_lifetime = "7d"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for access tokens.
    pub access_token_secret: String,

    /// HMAC secret for refresh tokens. Must differ from the access secret.
    pub refresh_token_secret: String,

    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Lifetime of refresh tokens. Also the expiry of the per-user session
    /// collection and of the cached identity.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_lifetime: Duration::from_secs(15 * 60),
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a secret is empty, both secrets are equal, or
    /// a lifetime is zero or the access lifetime exceeds the refresh lifetime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token_secret.is_empty() {
            return Err(ConfigError::Missing("auth.access_token_secret".into()));
        }
        if self.refresh_token_secret.is_empty() {
            return Err(ConfigError::Missing("auth.refresh_token_secret".into()));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(ConfigError::InvalidValue(
                "access and refresh token secrets must differ".into(),
            ));
        }
        if self.access_token_lifetime.is_zero() || self.refresh_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "token lifetimes must be greater than zero".into(),
            ));
        }
        if self.access_token_lifetime > self.refresh_token_lifetime {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime cannot exceed refresh_token_lifetime".into(),
            ));
        }
        Ok(())
    }
}
