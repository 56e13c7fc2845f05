//! Token service: issuance, verification, rotation and revocation.
//!
//! A token moves through `Issued -> Active -> {Expired | Revoked}`. Issuance
//! is pure CPU work; only the revocation check, rotation and revocation touch
//! the [`RevocationStore`], and none of them retry.
//!
//! # Usage
//!
//! ```ignore
//! use keyward_auth::prelude::*;
//!
//! let service = TokenService::new(config, revocation_store, identity_provider)?;
//!
//! let pair = service.issue(&identity)?;
//! let claims = service.verify(&pair.access_token).await?;
//! let next = service.rotate(&pair.refresh_token).await?;
//! service.revoke(&next.access_token).await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::AuthResult;
use crate::authz::{AuthorizationResolver, PermissionSet};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::storage::identity::{Identity, IdentityProvider};
use crate::storage::revocation::RevocationStore;
use crate::token::claims::{Claims, TokenUse};
use crate::token::codec::{CodecError, CredentialCodec};
use crate::token::revocation::{remaining_lifetime, revocation_key};

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,

    /// Long-lived, single-use refresh token.
    pub refresh_token: String,

    /// Always `"Bearer"`.
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Subject the pair was issued to.
    pub user_id: String,

    /// Display name at issuance.
    pub username: String,

    /// Role at issuance.
    pub role: String,
}

/// Result of a successful [`TokenService::revoke`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// The token was live and is now on the denylist.
    Revoked,
    /// The token was already expired or revoked; nothing changed.
    AlreadyUnusable,
}

/// Orchestrates the token lifecycle.
///
/// Holds no mutable state of its own; share it behind an `Arc`.
pub struct TokenService {
    access_codec: CredentialCodec,
    refresh_codec: CredentialCodec,
    revocation_store: Arc<dyn RevocationStore>,
    identity_provider: Arc<dyn IdentityProvider>,
    resolver: AuthorizationResolver,
    config: AuthConfig,
}

impl TokenService {
    /// Creates a new token service.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if `config` fails validation.
    pub fn new(
        config: AuthConfig,
        revocation_store: Arc<dyn RevocationStore>,
        identity_provider: Arc<dyn IdentityProvider>,
    ) -> AuthResult<Self> {
        config.validate()?;

        Ok(Self {
            access_codec: CredentialCodec::new(config.token.secret.as_bytes()),
            refresh_codec: CredentialCodec::new(config.token.refresh_secret().as_bytes()),
            revocation_store,
            identity_provider,
            resolver: AuthorizationResolver::new(),
            config,
        })
    }

    // =========================================================================
    // Issue
    // =========================================================================

    /// Issues a new token pair for an already authenticated identity.
    ///
    /// The access token embeds the permissions currently granted to the
    /// identity's role; the refresh token carries the subject only.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Encoding` if a token cannot be signed.
    pub fn issue(&self, identity: &Identity) -> AuthResult<TokenPair> {
        let now = OffsetDateTime::now_utc();
        let access_lifetime = self.config.token.access_token_lifetime;
        let refresh_lifetime = self.config.token.refresh_token_lifetime;

        let access_claims = Claims::builder(&self.config.issuer, &identity.id, TokenUse::Access)
            .display_name(&identity.display_name)
            .role(&identity.role)
            .permissions(self.resolver.permissions_for(&identity.role))
            .issued_at(now)
            .expires_in(to_time_duration(access_lifetime))
            .build();

        let refresh_claims = Claims::builder(&self.config.issuer, &identity.id, TokenUse::Refresh)
            .issued_at(now)
            .expires_in(to_time_duration(refresh_lifetime))
            .build();

        let access_token = self
            .access_codec
            .encode(&access_claims)
            .map_err(|e| AuthError::encoding(format!("access token: {}", e)))?;
        let refresh_token = self
            .refresh_codec
            .encode(&refresh_claims)
            .map_err(|e| AuthError::encoding(format!("refresh token: {}", e)))?;

        tracing::debug!(
            subject = %identity.id,
            role = %identity.role,
            jti = %access_claims.jti,
            "Issued token pair"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: access_lifetime.as_secs(),
            user_id: identity.id.clone(),
            username: identity.display_name.clone(),
            role: identity.role.clone(),
        })
    }

    /// Issues a token pair for a subject looked up by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::IdentityNotFound` if the provider has no such subject.
    pub async fn issue_for_subject(&self, subject: &str) -> AuthResult<TokenPair> {
        let identity = self.resolve_identity(subject).await?;
        self.issue(&identity)
    }

    /// Issues a token pair for a subject looked up by username.
    ///
    /// Credentials must have been checked by the caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::IdentityNotFound` if the provider has no such user.
    pub async fn issue_for_username(&self, username: &str) -> AuthResult<TokenPair> {
        let identity = self
            .identity_provider
            .find_by_username(username)
            .await?
            .ok_or_else(|| AuthError::identity_not_found(username))?;
        self.issue(&identity)
    }

    /// Issues a token pair for a new synthetic guest identity.
    ///
    /// The guest is never persisted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Encoding` if a token cannot be signed.
    pub fn guest_issue(&self) -> AuthResult<TokenPair> {
        let guest = Identity::guest();
        tracing::info!(subject = %guest.id, "Issuing guest token pair");
        self.issue(&guest)
    }

    // =========================================================================
    // Verify
    // =========================================================================

    /// Verifies an access token.
    ///
    /// Checks run cheapest first: signature and structure, then time bounds,
    /// then the revocation store. The returned claims carry the permissions
    /// of the token's role as resolved now, not as embedded at issuance.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` - bad signature, malformed, wrong issuer, wrong token
    ///   use, or not yet valid
    /// - `TokenExpired` - `exp` has passed
    /// - `TokenRevoked` - the token is on the denylist
    /// - `StoreUnavailable` - the revocation check could not be performed
    pub async fn verify(&self, token: &str) -> AuthResult<Claims> {
        let (claims, _) = self.verify_with_permissions(token).await?;
        Ok(claims)
    }

    /// Verifies an access token and returns the typed permission set along
    /// with the claims, resolved once.
    ///
    /// # Errors
    ///
    /// Same as [`verify`](Self::verify).
    pub async fn verify_with_permissions(
        &self,
        token: &str,
    ) -> AuthResult<(Claims, PermissionSet)> {
        let mut claims = self.authenticate(token, TokenUse::Access).await?;
        let permissions = self.permissions_for_claims(&claims);
        claims.permissions = permissions.to_strings();
        Ok((claims, permissions))
    }

    /// Verifies a refresh token with the same checks as [`verify`](Self::verify).
    ///
    /// # Errors
    ///
    /// Same as [`verify`](Self::verify).
    pub async fn verify_refresh(&self, token: &str) -> AuthResult<Claims> {
        self.authenticate(token, TokenUse::Refresh).await
    }

    async fn authenticate(&self, token: &str, expected: TokenUse) -> AuthResult<Claims> {
        let claims = self.decode_for(token, expected)?;
        let now = OffsetDateTime::now_utc().unix_timestamp();

        if claims.is_expired_at(now) {
            tracing::debug!(subject = %claims.sub, jti = %claims.jti, "Token expired");
            return Err(AuthError::TokenExpired);
        }

        let key = self.revocation_key(token);
        if self.store_exists(&key).await? {
            tracing::debug!(subject = %claims.sub, jti = %claims.jti, "Token revoked");
            return Err(AuthError::TokenRevoked);
        }

        Ok(claims)
    }

    // =========================================================================
    // Rotate
    // =========================================================================

    /// Exchanges a refresh token for a new pair.
    ///
    /// The identity is re-resolved so role changes take effect. The old
    /// refresh token is claimed on the denylist before the new pair is built;
    /// of any number of concurrent calls with the same token, exactly one
    /// wins and the rest fail with `TokenRevoked`.
    ///
    /// # Errors
    ///
    /// - Everything [`verify_refresh`](Self::verify_refresh) can return
    /// - `IdentityNotFound` - the subject no longer exists
    pub async fn rotate(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self.verify_refresh(refresh_token).await?;
        let identity = self.resolve_identity(&claims.sub).await?;

        let ttl = remaining_lifetime(&claims, OffsetDateTime::now_utc())
            .ok_or(AuthError::TokenExpired)?;

        let key = self.revocation_key(refresh_token);
        if !self.store_put_if_absent(&key, ttl).await? {
            tracing::info!(
                subject = %claims.sub,
                jti = %claims.jti,
                "Refresh token already consumed"
            );
            return Err(AuthError::TokenRevoked);
        }

        let pair = self.issue(&identity)?;
        tracing::info!(subject = %claims.sub, jti = %claims.jti, "Rotated refresh token");
        Ok(pair)
    }

    // =========================================================================
    // Revoke
    // =========================================================================

    /// Revokes an access or refresh token until its natural expiry.
    ///
    /// Idempotent: revoking a token that is already expired or revoked
    /// succeeds with [`RevokeOutcome::AlreadyUnusable`].
    ///
    /// # Errors
    ///
    /// - `InvalidToken` - the token does not decode or fails issuer checks
    /// - `StoreUnavailable` - the denylist write could not be performed
    pub async fn revoke(&self, token: &str) -> AuthResult<RevokeOutcome> {
        let claims = self
            .decode_for(token, TokenUse::Access)
            .or_else(|_| self.decode_for(token, TokenUse::Refresh))?;

        let Some(ttl) = remaining_lifetime(&claims, OffsetDateTime::now_utc()) else {
            tracing::debug!(subject = %claims.sub, jti = %claims.jti, "Revoke on expired token");
            return Ok(RevokeOutcome::AlreadyUnusable);
        };

        let key = self.revocation_key(token);
        if self.store_put_if_absent(&key, ttl).await? {
            tracing::info!(
                subject = %claims.sub,
                jti = %claims.jti,
                token_use = %claims.token_use,
                ttl_secs = ttl.as_secs(),
                "Token revoked"
            );
            Ok(RevokeOutcome::Revoked)
        } else {
            tracing::debug!(subject = %claims.sub, jti = %claims.jti, "Token already revoked");
            Ok(RevokeOutcome::AlreadyUnusable)
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Permissions granted to the role named in `claims`, resolved now.
    #[must_use]
    pub fn permissions_for_claims(&self, claims: &Claims) -> PermissionSet {
        match claims.role.as_deref() {
            Some(role) => self.resolver.permissions_for(role),
            None => PermissionSet::EMPTY,
        }
    }

    /// Gets the authorization resolver.
    #[must_use]
    pub fn resolver(&self) -> &AuthorizationResolver {
        &self.resolver
    }

    /// Gets the service configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Decodes a token of the expected kind and checks issuer and `nbf`.
    ///
    /// Every failure here is `InvalidToken`.
    fn decode_for(&self, token: &str, expected: TokenUse) -> AuthResult<Claims> {
        let codec = match expected {
            TokenUse::Access => &self.access_codec,
            TokenUse::Refresh => &self.refresh_codec,
        };

        let claims = codec.decode(token).map_err(|e| {
            tracing::debug!(error = %e, token_use = %expected, "Token rejected by codec");
            match e {
                CodecError::SignatureInvalid => AuthError::invalid_token("signature mismatch"),
                CodecError::Malformed { message } => AuthError::invalid_token(message),
                CodecError::Encoding { message } => AuthError::invalid_token(message),
            }
        })?;

        if claims.token_use != expected {
            return Err(AuthError::invalid_token(format!(
                "expected {} token, got {}",
                expected, claims.token_use
            )));
        }

        if claims.iss != self.config.issuer {
            return Err(AuthError::invalid_token("issuer mismatch"));
        }

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let leeway = i64::try_from(self.config.token.leeway.as_secs()).unwrap_or(i64::MAX);
        if claims.nbf > now.saturating_add(leeway) {
            return Err(AuthError::invalid_token("token not yet valid"));
        }

        Ok(claims)
    }

    async fn resolve_identity(&self, subject: &str) -> AuthResult<Identity> {
        if Identity::is_guest_subject(subject) {
            return Ok(Identity::guest_with_id(subject));
        }

        self.identity_provider
            .find_by_id(subject)
            .await?
            .ok_or_else(|| {
                tracing::info!(subject = %subject, "Identity no longer exists");
                AuthError::identity_not_found(subject)
            })
    }

    fn revocation_key(&self, token: &str) -> String {
        revocation_key(&self.config.revocation.key_prefix, token)
    }

    async fn store_exists(&self, key: &str) -> AuthResult<bool> {
        self.revocation_store.exists(key).await.inspect_err(|e| {
            tracing::warn!(error = %e, "Revocation check failed");
        })
    }

    async fn store_put_if_absent(&self, key: &str, ttl: std::time::Duration) -> AuthResult<bool> {
        self.revocation_store
            .put_if_absent(key, ttl)
            .await
            .inspect_err(|e| {
                tracing::warn!(error = %e, "Revocation write failed");
            })
    }
}

fn to_time_duration(d: std::time::Duration) -> time::Duration {
    time::Duration::try_from(d).unwrap_or(time::Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::storage::memory::{InMemoryIdentityProvider, InMemoryRevocationStore};
    use async_trait::async_trait;
    use std::time::Duration;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    // -------------------------------------------------------------------------
    // Test doubles
    // -------------------------------------------------------------------------

    struct UnavailableStore;

    #[async_trait]
    impl RevocationStore for UnavailableStore {
        async fn put(&self, _key: &str, _ttl: Duration) -> AuthResult<()> {
            Err(AuthError::store_unavailable("connection refused"))
        }

        async fn put_if_absent(&self, _key: &str, _ttl: Duration) -> AuthResult<bool> {
            Err(AuthError::store_unavailable("connection refused"))
        }

        async fn exists(&self, _key: &str) -> AuthResult<bool> {
            Err(AuthError::store_unavailable("connection refused"))
        }
    }

    fn create_service() -> (TokenService, Arc<InMemoryIdentityProvider>) {
        let provider = Arc::new(InMemoryIdentityProvider::with_identities([
            Identity::new("u1", "ada", "admin"),
            Identity::new("u2", "bob", "student"),
        ]));
        let service = TokenService::new(
            AuthConfig::with_secret(SECRET),
            Arc::new(InMemoryRevocationStore::new()),
            provider.clone(),
        )
        .unwrap();
        (service, provider)
    }

    fn encode_with(service: &TokenService, claims: &Claims) -> String {
        match claims.token_use {
            TokenUse::Access => service.access_codec.encode(claims).unwrap(),
            TokenUse::Refresh => service.refresh_codec.encode(claims).unwrap(),
        }
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = TokenService::new(
            AuthConfig::default(),
            Arc::new(InMemoryRevocationStore::new()),
            Arc::new(InMemoryIdentityProvider::new()),
        );
        assert!(matches!(result, Err(AuthError::Configuration { .. })));
    }

    #[test]
    fn test_new_rejects_sub_second_lifetime() {
        let config = AuthConfig {
            token: TokenConfig::new(SECRET).with_access_token_lifetime(Duration::from_millis(500)),
            ..AuthConfig::default()
        };
        let result = TokenService::new(
            config,
            Arc::new(InMemoryRevocationStore::new()),
            Arc::new(InMemoryIdentityProvider::new()),
        );
        assert!(matches!(result, Err(AuthError::Configuration { .. })));
    }

    // -------------------------------------------------------------------------
    // Issue / Verify
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_issue_then_verify() {
        let (service, _) = create_service();
        let identity = Identity::new("u2", "bob", "student");

        let pair = service.issue(&identity).unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 3600);
        assert_eq!(pair.user_id, "u2");
        assert_eq!(pair.username, "bob");
        assert_ne!(pair.access_token, pair.refresh_token);

        let claims = service.verify(&pair.access_token).await.unwrap();
        assert_eq!(claims.sub, "u2");
        assert_eq!(claims.name.as_deref(), Some("bob"));
        assert_eq!(claims.role.as_deref(), Some("student"));
        assert_eq!(claims.permissions, vec!["user:read", "data:read", "analysis:use"]);
    }

    #[tokio::test]
    async fn test_refresh_token_carries_subject_only() {
        let (service, _) = create_service();
        let pair = service.issue(&Identity::new("u1", "ada", "admin")).unwrap();

        let claims = service.verify_refresh(&pair.refresh_token).await.unwrap();
        assert_eq!(claims.sub, "u1");
        assert!(claims.name.is_none());
        assert!(claims.role.is_none());
        assert!(claims.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_token_use_is_enforced() {
        let (service, _) = create_service();
        let pair = service.issue(&Identity::new("u1", "ada", "admin")).unwrap();

        let err = service.verify(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));

        let err = service.rotate(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_unknown_role_gets_no_permissions() {
        let (service, _) = create_service();
        let pair = service
            .issue(&Identity::new("u9", "mallory", "superuser"))
            .unwrap();

        let claims = service.verify(&pair.access_token).await.unwrap();
        assert!(claims.permissions.is_empty());
    }

    #[tokio::test]
    async fn test_verify_with_permissions_matches_claims() {
        let (service, _) = create_service();
        let pair = service.issue_for_subject("u2").await.unwrap();

        let (claims, permissions) = service
            .verify_with_permissions(&pair.access_token)
            .await
            .unwrap();
        assert_eq!(permissions, crate::authz::Role::Student.permissions());
        assert_eq!(claims.permissions, permissions.to_strings());
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage_and_foreign_tokens() {
        let (service, _) = create_service();

        let err = service.verify("not.a.token").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));

        let foreign = CredentialCodec::new(b"ffffffffffffffffffffffffffffffff")
            .encode(&Claims::builder("keyward", "u1", TokenUse::Access).build())
            .unwrap();
        let err = service.verify(&foreign).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_issuer() {
        let (service, _) = create_service();
        let claims = Claims::builder("someone-else", "u1", TokenUse::Access).build();
        let token = encode_with(&service, &claims);

        let err = service.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_verify_rejects_future_nbf() {
        let (service, _) = create_service();
        let claims = Claims::builder("keyward", "u1", TokenUse::Access)
            .issued_at(OffsetDateTime::now_utc() + time::Duration::minutes(5))
            .build();
        let token = encode_with(&service, &claims);

        let err = service.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_expired_token_is_expired_even_if_revoked() {
        let (service, _) = create_service();
        let claims = Claims::builder("keyward", "u1", TokenUse::Access)
            .issued_at(OffsetDateTime::now_utc() - time::Duration::hours(2))
            .expires_in(time::Duration::hours(1))
            .build();
        let token = encode_with(&service, &claims);

        service
            .revocation_store
            .put(&service.revocation_key(&token), Duration::from_secs(60))
            .await
            .unwrap();

        let err = service.verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn test_verify_store_unavailable_fails_closed() {
        let service = TokenService::new(
            AuthConfig::with_secret(SECRET),
            Arc::new(UnavailableStore),
            Arc::new(InMemoryIdentityProvider::new()),
        )
        .unwrap();

        let pair = service.issue(&Identity::new("u1", "ada", "admin")).unwrap();
        let err = service.verify(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable { .. }));

        let err = service.revoke(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable { .. }));
    }

    // -------------------------------------------------------------------------
    // Rotate
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_rotate_issues_new_pair_and_consumes_old() {
        let (service, _) = create_service();
        let pair = service.issue_for_subject("u2").await.unwrap();

        let rotated = service.rotate(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);
        assert_eq!(rotated.user_id, "u2");

        let err = service.rotate(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRevoked));

        assert!(service.rotate(&rotated.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_rotate_picks_up_role_change() {
        let (service, provider) = create_service();
        let pair = service.issue_for_subject("u2").await.unwrap();
        assert_eq!(pair.role, "student");

        provider.set_role("u2", "researcher");

        let rotated = service.rotate(&pair.refresh_token).await.unwrap();
        assert_eq!(rotated.role, "researcher");

        let claims = service.verify(&rotated.access_token).await.unwrap();
        assert!(claims.permissions.contains(&"data:write".to_string()));
    }

    #[tokio::test]
    async fn test_rotate_deleted_identity() {
        let (service, provider) = create_service();
        let pair = service.issue_for_subject("u1").await.unwrap();

        provider.remove("u1");

        let err = service.rotate(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::IdentityNotFound { .. }));
    }

    #[tokio::test]
    async fn test_guest_rotation_skips_provider() {
        let (service, _) = create_service();
        let pair = service.guest_issue().unwrap();
        assert!(pair.user_id.starts_with("guest_"));
        assert_eq!(pair.role, "guest");

        let rotated = service.rotate(&pair.refresh_token).await.unwrap();
        assert_eq!(rotated.user_id, pair.user_id);
        assert_eq!(rotated.role, "guest");
    }

    // -------------------------------------------------------------------------
    // Revoke
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let (service, _) = create_service();
        let pair = service.issue_for_username("ada").await.unwrap();

        assert_eq!(
            service.revoke(&pair.access_token).await.unwrap(),
            RevokeOutcome::Revoked
        );
        assert_eq!(
            service.revoke(&pair.access_token).await.unwrap(),
            RevokeOutcome::AlreadyUnusable
        );

        let err = service.verify(&pair.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRevoked));
    }

    #[tokio::test]
    async fn test_revoke_refresh_token_blocks_rotation() {
        let (service, _) = create_service();
        let pair = service.issue_for_subject("u1").await.unwrap();

        assert_eq!(
            service.revoke(&pair.refresh_token).await.unwrap(),
            RevokeOutcome::Revoked
        );
        let err = service.rotate(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRevoked));
    }

    #[tokio::test]
    async fn test_revoke_expired_is_noop() {
        let (service, _) = create_service();
        let claims = Claims::builder("keyward", "u1", TokenUse::Access)
            .issued_at(OffsetDateTime::now_utc() - time::Duration::hours(2))
            .expires_in(time::Duration::hours(1))
            .build();
        let token = encode_with(&service, &claims);

        assert_eq!(
            service.revoke(&token).await.unwrap(),
            RevokeOutcome::AlreadyUnusable
        );
    }

    #[tokio::test]
    async fn test_revoke_invalid_token() {
        let (service, _) = create_service();
        let err = service.revoke("garbage").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_issue_for_unknown_subject() {
        let (service, _) = create_service();
        let err = service.issue_for_subject("nobody").await.unwrap_err();
        assert!(matches!(err, AuthError::IdentityNotFound { .. }));

        let err = service.issue_for_username("nobody").await.unwrap_err();
        assert!(matches!(err, AuthError::IdentityNotFound { .. }));
    }

    #[tokio::test]
    async fn test_separate_refresh_secret() {
        let mut config = AuthConfig::with_secret(SECRET);
        config.token.refresh_secret = Some("fedcba9876543210fedcba9876543210".to_string());
        let service = TokenService::new(
            config,
            Arc::new(InMemoryRevocationStore::new()),
            Arc::new(InMemoryIdentityProvider::with_identities([Identity::new(
                "u1", "ada", "admin",
            )])),
        )
        .unwrap();

        let pair = service.issue_for_subject("u1").await.unwrap();
        assert!(service.verify(&pair.access_token).await.is_ok());
        assert!(service.rotate(&pair.refresh_token).await.is_ok());
        assert_eq!(
            service.revoke(&pair.access_token).await.unwrap(),
            RevokeOutcome::Revoked
        );
    }

    #[test]
    fn test_token_pair_serialization() {
        let (service, _) = create_service();
        let pair = service.issue(&Identity::new("u1", "ada", "admin")).unwrap();
        let json = serde_json::to_value(&pair).unwrap();

        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["expiresIn"], 3600);
        assert_eq!(json["userId"], "u1");
        assert!(json["accessToken"].is_string());
        assert!(json["refreshToken"].is_string());
    }
}
