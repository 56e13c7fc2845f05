//! Token lifecycle configuration.
//!
//! Loaded once at process start and shared immutably afterwards. Durations
//! are written in humantime notation (`"15m"`, `"7d"`).

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::AuthError;

/// Minimum accepted length of a signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Root configuration for the token lifecycle.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "keyward"
///
/// [auth.token]
/// secret = "change-me-change-me-change-me-change-me"
/// access_token_lifetime = "1h"
/// refresh_token_lifetime = "7d"
///
/// [auth.revocation]
/// key_prefix = "token:blacklist:"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Value of the `iss` claim; tokens carrying any other issuer are rejected.
    pub issuer: String,

    /// Signing secrets and lifetimes.
    pub token: TokenConfig,

    /// Denylist key scheme.
    pub revocation: RevocationConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "keyward".to_string(),
            token: TokenConfig::default(),
            revocation: RevocationConfig::default(),
        }
    }
}

/// Signing secrets and token lifetimes.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenConfig {
    /// HMAC secret used to sign access tokens (and refresh tokens when
    /// `refresh_secret` is not set).
    pub secret: String,

    /// Optional dedicated secret for refresh tokens.
    pub refresh_secret: Option<String>,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Clock skew tolerated on the `nbf` check.
    #[serde(with = "humantime_serde")]
    pub leeway: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            refresh_secret: None,
            access_token_lifetime: Duration::from_secs(3600), // 1 hour
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 3600), // 7 days
            leeway: Duration::ZERO,
        }
    }
}

// Secrets stay out of debug output.
impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field(
                "refresh_secret",
                &self.refresh_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .field("leeway", &self.leeway)
            .finish()
    }
}

impl TokenConfig {
    /// Creates a token configuration with the given secret and default lifetimes.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }

    /// Sets a dedicated refresh token secret.
    #[must_use]
    pub fn with_refresh_secret(mut self, secret: impl Into<String>) -> Self {
        self.refresh_secret = Some(secret.into());
        self
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.refresh_token_lifetime = lifetime;
        self
    }

    /// Sets the `nbf` leeway.
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Secret used for refresh tokens.
    #[must_use]
    pub fn refresh_secret(&self) -> &str {
        self.refresh_secret.as_deref().unwrap_or(&self.secret)
    }
}

/// Revocation denylist settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RevocationConfig {
    /// Prefix prepended to every denylist key.
    pub key_prefix: String,
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self {
            key_prefix: "token:blacklist:".to_string(),
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl From<ConfigError> for AuthError {
    fn from(err: ConfigError) -> Self {
        AuthError::configuration(err.to_string())
    }
}

impl AuthConfig {
    /// Creates a configuration with the given signing secret and defaults elsewhere.
    #[must_use]
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            token: TokenConfig::new(secret),
            ..Self::default()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the signing secret is empty, and
    /// `ConfigError::InvalidValue` if:
    /// - The issuer is empty
    /// - A secret is shorter than [`MIN_SECRET_LEN`] bytes
    /// - A token lifetime is shorter than a second or not a whole number of seconds
    /// - The access token outlives the refresh token
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.is_empty() {
            return Err(ConfigError::InvalidValue(
                "issuer cannot be empty".to_string(),
            ));
        }

        if self.token.secret.is_empty() {
            return Err(ConfigError::Missing("token.secret".to_string()));
        }

        if self.token.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue(format!(
                "token.secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        if let Some(refresh_secret) = &self.token.refresh_secret
            && refresh_secret.len() < MIN_SECRET_LEN
        {
            return Err(ConfigError::InvalidValue(format!(
                "token.refresh_secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        validate_lifetime("access_token_lifetime", self.token.access_token_lifetime)?;
        validate_lifetime("refresh_token_lifetime", self.token.refresh_token_lifetime)?;

        if self.token.access_token_lifetime > self.token.refresh_token_lifetime {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime cannot exceed refresh_token_lifetime".to_string(),
            ));
        }

        Ok(())
    }
}

/// Token timestamps have one-second resolution, so lifetimes must be whole seconds.
fn validate_lifetime(name: &str, lifetime: Duration) -> Result<(), ConfigError> {
    if lifetime < Duration::from_secs(1) {
        return Err(ConfigError::InvalidValue(format!(
            "{name} must be at least 1s"
        )));
    }
    if lifetime.subsec_nanos() != 0 {
        return Err(ConfigError::InvalidValue(format!(
            "{name} must be a whole number of seconds"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.issuer, "keyward");
        assert_eq!(config.token.access_token_lifetime, Duration::from_secs(3600));
        assert_eq!(
            config.token.refresh_token_lifetime,
            Duration::from_secs(604_800)
        );
        assert_eq!(config.revocation.key_prefix, "token:blacklist:");
    }

    #[test]
    fn test_default_config_requires_secret() {
        let err = AuthConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_valid_config() {
        assert!(AuthConfig::with_secret(SECRET).validate().is_ok());
    }

    #[test]
    fn test_empty_issuer_fails_validation() {
        let mut config = AuthConfig::with_secret(SECRET);
        config.issuer = String::new();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("issuer"));
    }

    #[test]
    fn test_short_secret_fails_validation() {
        let err = AuthConfig::with_secret("too-short").validate().unwrap_err();
        assert!(err.to_string().contains("at least 32 bytes"));

        let mut config = AuthConfig::with_secret(SECRET);
        config.token.refresh_secret = Some("short".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lifetime_validation() {
        let mut config = AuthConfig::with_secret(SECRET);
        config.token.access_token_lifetime = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = AuthConfig::with_secret(SECRET);
        config.token.access_token_lifetime = Duration::from_secs(7200);
        config.token.refresh_token_lifetime = Duration::from_secs(3600);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cannot exceed"));
    }

    #[test]
    fn test_sub_second_lifetimes_fail_validation() {
        let mut config = AuthConfig::with_secret(SECRET);
        config.token.access_token_lifetime = Duration::from_millis(500);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
        assert!(err.to_string().contains("at least 1s"));

        let mut config = AuthConfig::with_secret(SECRET);
        config.token.access_token_lifetime = Duration::from_millis(1900);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("whole number of seconds"));

        let mut config = AuthConfig::with_secret(SECRET);
        config.token.refresh_token_lifetime = Duration::from_millis(7_200_500);
        assert!(config.validate().is_err());

        let mut config = AuthConfig::with_secret(SECRET);
        config.token.access_token_lifetime = Duration::from_secs(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_refresh_secret_fallback() {
        let token = TokenConfig::new(SECRET);
        assert_eq!(token.refresh_secret(), SECRET);

        let token = token.with_refresh_secret("fedcba9876543210fedcba9876543210");
        assert_eq!(token.refresh_secret(), "fedcba9876543210fedcba9876543210");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let token = TokenConfig::new(SECRET).with_refresh_secret("another-secret");
        let debug = format!("{:?}", token);
        assert!(!debug.contains(SECRET));
        assert!(!debug.contains("another-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_deserialize_humantime() {
        let json = r#"{
            "issuer": "test-issuer",
            "token": {
                "secret": "0123456789abcdef0123456789abcdef",
                "access_token_lifetime": "15m",
                "refresh_token_lifetime": "30d"
            }
        }"#;

        let config: AuthConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.issuer, "test-issuer");
        assert_eq!(config.token.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(
            config.token.refresh_token_lifetime,
            Duration::from_secs(30 * 24 * 3600)
        );
        assert_eq!(config.token.leeway, Duration::ZERO);
        assert_eq!(config.revocation.key_prefix, "token:blacklist:");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_error_into_auth_error() {
        let err: AuthError = ConfigError::Missing("token.secret".to_string()).into();
        assert!(matches!(err, AuthError::Configuration { .. }));
    }
}
