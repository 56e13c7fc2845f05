//! Storage contracts consumed by the token service.
//!
//! - Revocation denylist with per-entry TTL
//! - Identity lookup
//!
//! # Implementations
//!
//! - [`memory`] - process-local backends for single-instance use and tests
//! - `keyward-auth-redis` - shared Redis revocation store

pub mod identity;
pub mod memory;
pub mod revocation;

pub use identity::{GUEST_ID_PREFIX, Identity, IdentityProvider};
pub use memory::{InMemoryIdentityProvider, InMemoryRevocationStore};
pub use revocation::RevocationStore;
