//! Revocation store selection and lifecycle.

use std::sync::Arc;

use anyhow::{Context, Result};
use keyward_auth::{InMemoryRevocationStore, RevocationStore};
use keyward_auth_redis::{RedisConfig, RedisRevocationStore};

use crate::config::StoreBackend;

/// The revocation store opened for this process.
pub enum Store {
    Memory(Arc<InMemoryRevocationStore>),
    Redis(RedisRevocationStore),
}

impl Store {
    pub async fn open(backend: StoreBackend, redis: &RedisConfig) -> Result<Self> {
        match backend {
            StoreBackend::Memory => {
                tracing::warn!("Using process-local revocation store; revocations are not shared");
                Ok(Self::Memory(Arc::new(InMemoryRevocationStore::new())))
            }
            StoreBackend::Redis => {
                let store = RedisRevocationStore::connect(redis)
                    .await
                    .with_context(|| format!("cannot open revocation store at {}", redis.url))?;
                Ok(Self::Redis(store))
            }
        }
    }

    pub fn handle(&self) -> Arc<dyn RevocationStore> {
        match self {
            Self::Memory(store) => store.clone(),
            Self::Redis(store) => Arc::new(store.clone()),
        }
    }

    pub fn close(&self) {
        if let Self::Redis(store) = self {
            store.close();
        }
    }
}
