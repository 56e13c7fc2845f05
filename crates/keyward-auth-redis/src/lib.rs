//! Redis storage backend for keyward-auth.
//!
//! Provides a revocation store shared by every instance pointed at the same
//! Redis, so a revocation is visible everywhere as soon as it is written.
//! Entries carry a native `PX` expiry and disappear with the token they
//! block.
//!
//! # Example
//!
//! ```ignore
//! use keyward_auth_redis::{RedisConfig, RedisRevocationStore};
//!
//! let store = RedisRevocationStore::connect(&RedisConfig::default()).await?;
//! let service = TokenService::new(config, Arc::new(store.clone()), provider)?;
//!
//! // at shutdown
//! store.close();
//! ```

pub mod revocation;

use keyward_auth::AuthError;
use serde::{Deserialize, Serialize};

pub use revocation::RedisRevocationStore;

// =============================================================================
// Configuration
// =============================================================================

/// Redis connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Bound on pool checkout and on every command, in milliseconds
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    10
}

fn default_redis_timeout_ms() -> u64 {
    5000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during Redis store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The pool could not be built from the configuration.
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(#[from] deadpool_redis::CreatePoolError),

    /// No connection could be checked out of the pool.
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// A command failed.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A command did not complete in time.
    #[error("Redis operation '{operation}' timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::store_unavailable(err.to_string())
    }
}

/// Result type for Redis store operations.
pub type StoreResult<T> = Result<T, StoreError>;
