//! # keyward-auth
//!
//! Authentication token lifecycle.
//!
//! This crate provides:
//! - Paired access/refresh token issuance
//! - Stateless verification with a shared revocation denylist
//! - One-time-use refresh token rotation
//! - Idempotent revocation
//! - Fixed role to permission resolution
//!
//! ## Overview
//!
//! The [`TokenService`] is the entry point. It signs tokens with the
//! [`CredentialCodec`](token::CredentialCodec), records revocations in a
//! [`RevocationStore`] whose entries expire with the tokens they block, and
//! looks identities up through an [`IdentityProvider`]. Both collaborators
//! are passed in explicitly, so backends (in-memory, Redis) and test doubles
//! are interchangeable.
//!
//! ## Modules
//!
//! - [`config`] - Token lifecycle configuration
//! - [`token`] - Claims, codec and token service
//! - [`authz`] - Roles, permissions and the authorization resolver
//! - [`storage`] - Revocation store and identity provider contracts
//! - [`middleware`] - Axum bearer token extractor
//! - [`error`] - Error taxonomy

pub mod authz;
pub mod config;
pub mod error;
pub mod middleware;
pub mod storage;
pub mod token;

pub use authz::{AuthorizationResolver, Permission, PermissionSet, Role};
pub use config::{AuthConfig, ConfigError, RevocationConfig, TokenConfig};
pub use error::{AuthError, ErrorCategory};
pub use middleware::{AuthContext, AuthState, BearerAuth, OptionalBearerAuth};
pub use storage::{
    Identity, IdentityProvider, InMemoryIdentityProvider, InMemoryRevocationStore,
    RevocationStore,
};
pub use token::{Claims, RevokeOutcome, TokenPair, TokenService, TokenUse};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use keyward_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::authz::{AuthorizationResolver, Permission, PermissionSet, Role};
    pub use crate::config::{AuthConfig, ConfigError, RevocationConfig, TokenConfig};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::middleware::{AuthContext, AuthState, BearerAuth, OptionalBearerAuth};
    pub use crate::storage::{
        Identity, IdentityProvider, InMemoryIdentityProvider, InMemoryRevocationStore,
        RevocationStore,
    };
    pub use crate::token::{
        Claims, CodecError, CredentialCodec, RevokeOutcome, TokenPair, TokenService, TokenUse,
    };
}
