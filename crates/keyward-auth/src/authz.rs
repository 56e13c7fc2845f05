//! Role to permission resolution.
//!
//! The role table is fixed at compile time. Each [`Role`] maps to a constant
//! slice of [`Permission`]s; any role string that does not parse maps to the
//! empty set, so unknown roles are denied everything.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Permission
// =============================================================================

/// A capability that can be granted to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "user:read")]
    UserRead,
    #[serde(rename = "user:write")]
    UserWrite,
    #[serde(rename = "data:read")]
    DataRead,
    #[serde(rename = "data:write")]
    DataWrite,
    #[serde(rename = "data:delete")]
    DataDelete,
    #[serde(rename = "analysis:use")]
    AnalysisUse,
    #[serde(rename = "system:admin")]
    SystemAdmin,
}

impl Permission {
    /// Every known permission, in canonical order.
    pub const ALL: &'static [Permission] = &[
        Permission::UserRead,
        Permission::UserWrite,
        Permission::DataRead,
        Permission::DataWrite,
        Permission::DataDelete,
        Permission::AnalysisUse,
        Permission::SystemAdmin,
    ];

    /// Wire form of the permission, as carried in token claims.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UserRead => "user:read",
            Self::UserWrite => "user:write",
            Self::DataRead => "data:read",
            Self::DataWrite => "data:write",
            Self::DataDelete => "data:delete",
            Self::AnalysisUse => "analysis:use",
            Self::SystemAdmin => "system:admin",
        }
    }

    /// Parses the wire form. Returns `None` for unknown capability strings.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == s)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// Error returned when parsing an unrecognized permission string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission: {0}")]
pub struct UnknownPermission(pub String);

// =============================================================================
// Role
// =============================================================================

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::UserRead,
    Permission::UserWrite,
    Permission::DataRead,
    Permission::DataWrite,
    Permission::DataDelete,
    Permission::AnalysisUse,
    Permission::SystemAdmin,
];

const RESEARCHER_PERMISSIONS: &[Permission] = &[
    Permission::UserRead,
    Permission::DataRead,
    Permission::DataWrite,
    Permission::AnalysisUse,
];

const STUDENT_PERMISSIONS: &[Permission] = &[
    Permission::UserRead,
    Permission::DataRead,
    Permission::AnalysisUse,
];

const GUEST_PERMISSIONS: &[Permission] = &[Permission::UserRead, Permission::DataRead];

/// A role an identity can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Researcher,
    Student,
    Guest,
}

impl Role {
    /// Wire form of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Researcher => "researcher",
            Self::Student => "student",
            Self::Guest => "guest",
        }
    }

    /// Parses a role name. Matching is exact; `"Admin"` is not a role.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "researcher" => Some(Self::Researcher),
            "student" => Some(Self::Student),
            "guest" => Some(Self::Guest),
            _ => None,
        }
    }

    /// The fixed permission set granted to this role.
    #[must_use]
    pub const fn permissions(&self) -> PermissionSet {
        match self {
            Self::Admin => PermissionSet(ADMIN_PERMISSIONS),
            Self::Researcher => PermissionSet(RESEARCHER_PERMISSIONS),
            Self::Student => PermissionSet(STUDENT_PERMISSIONS),
            Self::Guest => PermissionSet(GUEST_PERMISSIONS),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PermissionSet
// =============================================================================

/// An ordered, immutable set of permissions.
///
/// Backed by a `'static` slice from the role table, so copies are free and
/// the set can never be modified after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSet(&'static [Permission]);

impl PermissionSet {
    /// The empty set, granted to unknown roles.
    pub const EMPTY: PermissionSet = PermissionSet(&[]);

    /// Returns `true` if the set grants `permission`.
    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Returns `true` if the set grants nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// Wire strings in table order, for embedding in access token claims.
    #[must_use]
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|p| p.as_str().to_string()).collect()
    }
}

impl IntoIterator for PermissionSet {
    type Item = Permission;
    type IntoIter = std::iter::Copied<std::slice::Iter<'static, Permission>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

// =============================================================================
// AuthorizationResolver
// =============================================================================

/// Answers role to permission queries against the fixed role table.
///
/// Stateless; callers should resolve on every decision instead of trusting
/// the permission list embedded in a previously issued token.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationResolver;

impl AuthorizationResolver {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Permissions granted to `role`. Unknown roles get [`PermissionSet::EMPTY`].
    #[must_use]
    pub fn permissions_for(&self, role: &str) -> PermissionSet {
        match Role::parse(role) {
            Some(role) => role.permissions(),
            None => {
                tracing::debug!(role = %role, "Unknown role resolved to empty permission set");
                PermissionSet::EMPTY
            }
        }
    }

    /// Returns `true` if `role` grants `permission`.
    #[must_use]
    pub fn is_permitted(&self, role: &str, permission: Permission) -> bool {
        self.permissions_for(role).contains(permission)
    }
}
