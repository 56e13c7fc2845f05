//! Claim set carried inside access and refresh tokens.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::authz::PermissionSet;

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived, single-use token exchanged for a new pair.
    Refresh,
}

impl TokenUse {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token claims.
///
/// Access tokens carry the display name, role and the permissions derived
/// from that role at issuance. Refresh tokens carry only the subject; the
/// rest is re-resolved when they are exchanged.
///
/// Timestamps are Unix seconds. A well-formed claim set satisfies
/// `nbf <= iat < exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer.
    pub iss: String,

    /// Subject (stable identity ID).
    pub sub: String,

    /// Display name of the subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Role name of the subject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Capability strings, in role-table order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,

    /// Issued at.
    pub iat: i64,

    /// Not before.
    pub nbf: i64,

    /// Expiration time.
    pub exp: i64,

    /// Unique token ID.
    pub jti: String,

    /// Access or refresh.
    pub token_use: TokenUse,
}

impl Claims {
    /// Creates a new builder. Timestamps default to "now" and one hour of validity.
    #[must_use]
    pub fn builder(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        token_use: TokenUse,
    ) -> ClaimsBuilder {
        ClaimsBuilder::new(issuer, subject, token_use)
    }

    /// Returns `true` if `nbf <= iat < exp`.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.nbf <= self.iat && self.iat < self.exp
    }

    /// Returns `true` if the token is expired at `now` (Unix seconds).
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }
}

/// Builder for [`Claims`].
pub struct ClaimsBuilder {
    iss: String,
    sub: String,
    name: Option<String>,
    role: Option<String>,
    permissions: Vec<String>,
    iat: i64,
    sub_second: bool,
    lifetime: i64,
    jti: String,
    token_use: TokenUse,
}

impl ClaimsBuilder {
    fn new(issuer: impl Into<String>, subject: impl Into<String>, token_use: TokenUse) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            iss: issuer.into(),
            sub: subject.into(),
            name: None,
            role: None,
            permissions: Vec::new(),
            iat: now.unix_timestamp(),
            sub_second: now.nanosecond() > 0,
            lifetime: 3600,
            jti: uuid::Uuid::new_v4().to_string(),
            token_use,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the role.
    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Embeds a resolved permission set.
    #[must_use]
    pub fn permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = permissions.to_strings();
        self
    }

    /// Sets the issuance instant. `nbf` always equals `iat`.
    ///
    /// `iat` is truncated to whole seconds while `exp` is rounded up, so the
    /// token is valid for at least the full lifetime.
    #[must_use]
    pub fn issued_at(mut self, at: OffsetDateTime) -> Self {
        self.iat = at.unix_timestamp();
        self.sub_second = at.nanosecond() > 0;
        self
    }

    /// Sets the lifetime relative to `iat`.
    #[must_use]
    pub fn expires_in(mut self, lifetime: time::Duration) -> Self {
        self.lifetime = lifetime.whole_seconds();
        self
    }

    /// Overrides the generated token ID.
    #[must_use]
    pub fn jti(mut self, jti: impl Into<String>) -> Self {
        self.jti = jti.into();
        self
    }

    /// Builds the claims.
    #[must_use]
    pub fn build(self) -> Claims {
        Claims {
            iss: self.iss,
            sub: self.sub,
            name: self.name,
            role: self.role,
            permissions: self.permissions,
            iat: self.iat,
            nbf: self.iat,
            exp: self
                .iat
                .saturating_add(self.lifetime)
                .saturating_add(i64::from(self.sub_second && self.lifetime > 0)),
            jti: self.jti,
            token_use: self.token_use,
        }
    }
}
