//! Redis-backed revocation store.
//!
//! - `put` is `SET key "revoked" PX <ms>`
//! - `put_if_absent` is `SET key "revoked" PX <ms> NX`
//! - `exists` is `EXISTS key`
//!
//! Every call, including the pool checkout, is bounded by the configured
//! timeout. Failures are never retried.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use keyward_auth::{AuthResult, RevocationStore};
use redis::AsyncCommands;

use crate::{RedisConfig, StoreError, StoreResult};

/// Value stored under every denylist key.
const SENTINEL: &str = "revoked";

/// Revocation store backed by a deadpool-redis connection pool.
///
/// Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct RedisRevocationStore {
    pool: Pool,
    timeout: Duration,
}

impl RedisRevocationStore {
    /// Opens a pool to Redis and verifies it with `PING`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreUnavailable` if the pool cannot be created or
    /// Redis does not answer within the timeout.
    pub async fn connect(config: &RedisConfig) -> AuthResult<Self> {
        tracing::info!(url = %config.url, "Connecting to Redis");

        let timeout = Duration::from_millis(config.timeout_ms);
        let mut redis_config = Config::from_url(&config.url);
        if let Some(ref mut pool_config) = redis_config.pool {
            pool_config.max_size = config.pool_size;
            pool_config.timeouts.wait = Some(timeout);
            pool_config.timeouts.create = Some(timeout);
            pool_config.timeouts.recycle = Some(timeout);
        }

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(StoreError::from)?;

        let store = Self { pool, timeout };
        store.ping().await.inspect_err(|e| {
            tracing::warn!(error = %e, "Failed to connect to Redis");
        })?;

        tracing::info!("Connected to Redis");
        Ok(store)
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: Pool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Closes the pool. Subsequent operations fail with `StoreUnavailable`.
    pub fn close(&self) {
        self.pool.close();
        tracing::info!("Redis revocation store closed");
    }

    /// Checks connectivity with `PING`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreUnavailable` if Redis cannot be reached.
    pub async fn ping(&self) -> AuthResult<()> {
        self.bounded("PING", async {
            let mut conn = self.pool.get().await?;
            let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = StoreResult<T>>,
    ) -> AuthResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout {
                operation,
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
            .into()),
        }
    }
}

/// `PX` argument for a TTL. Redis rejects zero, so the minimum is 1ms.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn put(&self, key: &str, ttl: Duration) -> AuthResult<()> {
        self.bounded("SET", async {
            let mut conn = self.pool.get().await?;
            let _: () = redis::cmd("SET")
                .arg(key)
                .arg(SENTINEL)
                .arg("PX")
                .arg(ttl_millis(ttl))
                .query_async(&mut conn)
                .await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn put_if_absent(&self, key: &str, ttl: Duration) -> AuthResult<bool> {
        self.bounded("SET NX", async {
            let mut conn = self.pool.get().await?;
            let reply: Option<String> = redis::cmd("SET")
                .arg(key)
                .arg(SENTINEL)
                .arg("PX")
                .arg(ttl_millis(ttl))
                .arg("NX")
                .query_async(&mut conn)
                .await?;
            Ok::<_, StoreError>(reply.is_some())
        })
        .await
    }

    async fn exists(&self, key: &str) -> AuthResult<bool> {
        self.bounded("EXISTS", async {
            let mut conn = self.pool.get().await?;
            let found: bool = conn.exists(key).await?;
            Ok::<_, StoreError>(found)
        })
        .await
    }
}
