//! In-memory storage backends.
//!
//! Process-local, so revocations are not visible to other instances. Meant
//! for single-process deployments and tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::identity::{Identity, IdentityProvider};
use super::revocation::RevocationStore;
use crate::AuthResult;

// =============================================================================
// Revocation store
// =============================================================================

/// Writes between full sweeps of expired entries.
const PURGE_INTERVAL: usize = 256;

/// DashMap-backed revocation store with per-entry deadlines.
///
/// Expired entries read as absent. They are removed when read, and every
/// [`PURGE_INTERVAL`] writes trigger a full sweep, so the map stays bounded
/// by the entries still live.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    entries: DashMap<String, Instant>,
    writes: AtomicUsize,
}

impl InMemoryRevocationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every expired entry. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, deadline| *deadline > now);
        before.saturating_sub(self.entries.len())
    }

    fn record_write(&self) {
        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % PURGE_INTERVAL == 0 {
            let purged = self.purge_expired();
            if purged > 0 {
                tracing::debug!(
                    purged,
                    remaining = self.entries.len(),
                    "Purged expired revocations"
                );
            }
        }
    }

    /// Number of stored entries, including ones expired but not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn put(&self, key: &str, ttl: Duration) -> AuthResult<()> {
        self.entries.insert(key.to_string(), Instant::now() + ttl);
        self.record_write();
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, ttl: Duration) -> AuthResult<bool> {
        let now = Instant::now();
        let claimed = match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > now {
                    false
                } else {
                    entry.insert(now + ttl);
                    true
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now + ttl);
                true
            }
        };

        // Entry guard is dropped by now; sweeping under it deadlocks.
        if claimed {
            self.record_write();
        }
        Ok(claimed)
    }

    async fn exists(&self, key: &str) -> AuthResult<bool> {
        let now = Instant::now();
        if self
            .entries
            .remove_if(key, |_, deadline| *deadline <= now)
            .is_some()
        {
            return Ok(false);
        }
        Ok(self.entries.get(key).is_some_and(|deadline| *deadline > now))
    }
}

// =============================================================================
// Identity provider
// =============================================================================

/// DashMap-backed identity provider keyed by subject ID.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    identities: DashMap<String, Identity>,
}

impl InMemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider pre-populated with `identities`.
    #[must_use]
    pub fn with_identities(identities: impl IntoIterator<Item = Identity>) -> Self {
        let provider = Self::new();
        for identity in identities {
            provider.insert(identity);
        }
        provider
    }

    /// Inserts or replaces an identity.
    pub fn insert(&self, identity: Identity) {
        self.identities.insert(identity.id.clone(), identity);
    }

    /// Removes an identity. Returns the removed value, if any.
    pub fn remove(&self, id: &str) -> Option<Identity> {
        self.identities.remove(id).map(|(_, identity)| identity)
    }

    /// Changes the role of an existing identity. Returns `false` if absent.
    pub fn set_role(&self, id: &str, role: impl Into<String>) -> bool {
        match self.identities.get_mut(id) {
            Some(mut identity) => {
                identity.role = role.into();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<Identity>> {
        Ok(self.identities.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Identity>> {
        Ok(self
            .identities
            .iter()
            .find(|entry| entry.display_name == username)
            .map(|entry| entry.value().clone()))
    }
}
