//! Identity provider contract.
//!
//! Resolves the current role and display name of a subject. Consulted on
//! issuance and on every rotation, so a role change takes effect at the
//! next refresh.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::authz::Role;

/// Subject ID prefix reserved for synthetic guest identities.
pub const GUEST_ID_PREFIX: &str = "guest_";

/// A resolved identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable, opaque subject identifier.
    pub id: String,

    /// Display name (username).
    pub display_name: String,

    /// Role name. Unknown roles are allowed here and resolve to no permissions.
    pub role: String,
}

impl Identity {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role: role.into(),
        }
    }

    /// Creates a fresh guest identity with a random subject ID.
    #[must_use]
    pub fn guest() -> Self {
        let id = format!("{}{}", GUEST_ID_PREFIX, uuid::Uuid::new_v4().simple());
        Self::guest_with_id(id)
    }

    /// Re-creates the guest identity for an existing guest subject ID.
    #[must_use]
    pub fn guest_with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: "Guest".to_string(),
            role: Role::Guest.as_str().to_string(),
        }
    }

    /// Returns `true` if `subject` names a guest identity.
    #[must_use]
    pub fn is_guest_subject(subject: &str) -> bool {
        subject.starts_with(GUEST_ID_PREFIX)
    }
}

/// Lookup of identities from the backing user store.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Finds an identity by subject ID.
    ///
    /// Returns `Ok(None)` if the identity does not exist.
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<Identity>>;

    /// Finds an identity by username.
    ///
    /// Returns `Ok(None)` if the identity does not exist.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Identity>>;
}
