//! Revocation store contract.
//!
//! The denylist of tokens invalidated before their natural expiry. Every
//! entry carries a TTL equal to the blocked token's remaining lifetime, so
//! the store never holds more entries than there are live revoked tokens.
//!
//! # Requirements
//!
//! - Entries must be visible to every instance sharing the store as soon as
//!   the write returns
//! - `put_if_absent` must be atomic (single check-and-set, no read-modify-write)
//! - Any backend fault must surface as `AuthError::StoreUnavailable`; a
//!   failed lookup must never be reported as "not revoked"
//!
//! # Implementations
//!
//! - [`InMemoryRevocationStore`](super::memory::InMemoryRevocationStore) - single process, tests
//! - `keyward-auth-redis` - shared Redis backend

use std::time::Duration;

use async_trait::async_trait;

use crate::AuthResult;

/// Key/value store with per-entry expiry, used as a token denylist.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Stores `key` until `ttl` elapses. Overwrites any existing entry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreUnavailable` if the backend cannot be reached.
    async fn put(&self, key: &str, ttl: Duration) -> AuthResult<()>;

    /// Stores `key` only if no live entry exists.
    ///
    /// Returns `true` if this call created the entry, `false` if it was
    /// already present.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreUnavailable` if the backend cannot be reached.
    async fn put_if_absent(&self, key: &str, ttl: Duration) -> AuthResult<bool>;

    /// Returns `true` if a live entry exists for `key`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreUnavailable` if the backend cannot be reached.
    async fn exists(&self, key: &str) -> AuthResult<bool>;
}
