//! Authentication and authorization error types.
//!
//! Every failure the token lifecycle can produce is a distinct variant so
//! callers can tell "log in again" (expired, revoked) apart from "malformed
//! request" (invalid) and from infrastructure faults (store unavailable).

use std::fmt;

/// Errors that can occur during token issuance, verification, rotation and revocation.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token is malformed, carries a bad signature, or has the wrong shape.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The token's `exp` has passed.
    #[error("Token expired")]
    TokenExpired,

    /// The token is on the revocation denylist.
    #[error("Token revoked")]
    TokenRevoked,

    /// The subject behind a still-valid token no longer exists.
    #[error("Identity not found: {subject}")]
    IdentityNotFound {
        /// Subject identifier that could not be resolved.
        subject: String,
    },

    /// The revocation store (or identity backend) could not be reached.
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// Description of the infrastructure fault.
        message: String,
    },

    /// The request carries no usable credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of why the request is unauthorized.
        message: String,
    },

    /// The authenticated identity lacks a required capability.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of why access is forbidden.
        message: String,
    },

    /// Claims could not be encoded into a token.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `IdentityNotFound` error.
    #[must_use]
    pub fn identity_not_found(subject: impl Into<String>) -> Self {
        Self::IdentityNotFound {
            subject: subject.into(),
        }
    }

    /// Creates a new `StoreUnavailable` error.
    #[must_use]
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken { .. }
                | Self::TokenExpired
                | Self::TokenRevoked
                | Self::IdentityNotFound { .. }
                | Self::Unauthorized { .. }
                | Self::Forbidden { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. }
                | Self::Encoding { .. }
                | Self::Configuration { .. }
        )
    }

    /// Returns `true` if this is a token-related error.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken { .. } | Self::TokenExpired | Self::TokenRevoked
        )
    }

    /// Returns `true` if the client must log in again to continue.
    ///
    /// An expired token may still be replaced through rotation; a revoked
    /// token or a vanished identity always requires a fresh login.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::TokenExpired | Self::TokenRevoked | Self::IdentityNotFound { .. }
        )
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidToken { .. } => ErrorCategory::Token,
            Self::TokenExpired => ErrorCategory::Token,
            Self::TokenRevoked => ErrorCategory::Token,
            Self::IdentityNotFound { .. } => ErrorCategory::Authentication,
            Self::StoreUnavailable { .. } => ErrorCategory::Infrastructure,
            Self::Unauthorized { .. } => ErrorCategory::Authentication,
            Self::Forbidden { .. } => ErrorCategory::Authorization,
            Self::Encoding { .. } => ErrorCategory::Internal,
            Self::Configuration { .. } => ErrorCategory::Configuration,
        }
    }

    /// Returns the RFC 6750 bearer error code for this error.
    #[must_use]
    pub fn bearer_error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken { .. } => "invalid_token",
            Self::TokenExpired => "invalid_token",
            Self::TokenRevoked => "invalid_token",
            Self::IdentityNotFound { .. } => "invalid_token",
            Self::Unauthorized { .. } => "invalid_request",
            Self::Forbidden { .. } => "insufficient_scope",
            Self::StoreUnavailable { .. } => "temporarily_unavailable",
            Self::Encoding { .. } => "server_error",
            Self::Configuration { .. } => "server_error",
        }
    }
}

/// Categories of authentication/authorization errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Authentication-related errors (identity verification).
    Authentication,
    /// Authorization-related errors (permission checks).
    Authorization,
    /// Token-related errors (validation, expiration, revocation).
    Token,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Authorization => write!(f, "authorization"),
            Self::Token => write!(f, "token"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
