//! Request-scoped authentication context.

use std::sync::Arc;

use crate::authz::{Permission, PermissionSet};
use crate::error::AuthError;
use crate::token::claims::Claims;

/// Authenticated identity attached to a request.
///
/// `permissions` is resolved from the token's role when the request is
/// authenticated; the list embedded in the token is not consulted.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Verified access token claims.
    pub claims: Arc<Claims>,

    /// Permissions granted to the role, resolved at authentication time.
    pub permissions: PermissionSet,
}

impl AuthContext {
    /// Returns the subject (identity ID).
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    /// Returns the display name, if the token carries one.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.claims.name.as_deref()
    }

    /// Returns the role, if the token carries one.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.claims.role.as_deref()
    }

    /// Returns the token ID.
    #[must_use]
    pub fn jti(&self) -> &str {
        &self.claims.jti
    }

    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns `Forbidden` unless the context grants `permission`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` naming the missing permission.
    pub fn require_permission(&self, permission: Permission) -> Result<(), AuthError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            tracing::debug!(
                subject = %self.subject(),
                permission = %permission,
                "Permission denied"
            );
            Err(AuthError::forbidden(format!(
                "Missing required permission: {}",
                permission
            )))
        }
    }

    /// Returns `true` if the subject is a synthetic guest.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        crate::storage::Identity::is_guest_subject(self.subject())
    }
}
