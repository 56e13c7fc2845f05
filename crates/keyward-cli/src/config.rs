//! Application configuration.
//!
//! Layered from an optional TOML file and `KEYWARD__SECTION__KEY`
//! environment overrides, loaded once at startup.

use std::path::PathBuf;

use anyhow::{Context, Result};
use keyward_auth::{AuthConfig, Identity};
use keyward_auth_redis::RedisConfig;
use serde::{Deserialize, Serialize};

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "keyward.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub redis: RedisConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    /// Identities served by the in-process identity provider.
    pub identities: Vec<Identity>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.auth.validate().context("invalid [auth] section")?;

        if self.store.backend == StoreBackend::Redis {
            if self.redis.url.is_empty() {
                anyhow::bail!("redis.url cannot be empty");
            }
            if self.redis.pool_size == 0 {
                anyhow::bail!("redis.pool_size must be > 0");
            }
        }

        for identity in &self.identities {
            if identity.id.is_empty() {
                anyhow::bail!("identities: id cannot be empty");
            }
        }

        Ok(())
    }

    /// Config as JSON with secrets masked.
    pub fn redacted(&self) -> Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(token) = value.pointer_mut("/auth/token") {
            token["secret"] = "[REDACTED]".into();
            if !token["refresh_secret"].is_null() {
                token["refresh_secret"] = "[REDACTED]".into();
            }
        }
        Ok(value)
    }
}

pub mod loader {
    use super::*;
    use config::{Config, Environment, File};

    pub fn load_config(path: Option<&str>) -> Result<AppConfig> {
        let mut builder = Config::builder();
        let path = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_PATH));
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }
        // Environment variable overrides, e.g., KEYWARD__AUTH__TOKEN__SECRET=...
        builder = builder.add_source(
            Environment::with_prefix("KEYWARD")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder.build().context("config build error")?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .context("config deserialize error")?;
        merged.validate()?;
        Ok(merged)
    }
}
