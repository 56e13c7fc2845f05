//! Bearer token authentication extractor.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use keyward_auth::authz::Permission;
//! use keyward_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn protected_handler(BearerAuth(auth): BearerAuth) -> Result<String, AuthError> {
//!     auth.require_permission(Permission::DataRead)?;
//!     Ok(format!("Hello, {}!", auth.subject()))
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(AuthState::new(token_service));
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AuthError;
use crate::token::service::TokenService;

use super::types::AuthContext;

// =============================================================================
// Auth State
// =============================================================================

/// State required by the [`BearerAuth`] extractor.
///
/// Include it in the application state and expose it through `FromRef`.
#[derive(Clone)]
pub struct AuthState {
    /// Token service used to verify presented tokens.
    pub token_service: Arc<TokenService>,
}

impl AuthState {
    pub fn new(token_service: Arc<TokenService>) -> Self {
        Self { token_service }
    }
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// Axum extractor that verifies `Authorization: Bearer <token>`.
///
/// Rejects with `Unauthorized` when the header is missing or uses another
/// scheme, and with the token service's error otherwise.
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let token = bearer_token(parts)?;

        let (claims, permissions) = auth_state
            .token_service
            .verify_with_permissions(token)
            .await?;

        let context = AuthContext {
            claims: Arc::new(claims),
            permissions,
        };

        tracing::debug!(
            subject = %context.subject(),
            jti = %context.jti(),
            "Request authenticated"
        );

        Ok(BearerAuth(context))
    }
}

/// Like [`BearerAuth`] but yields `None` when no `Authorization` header is sent.
///
/// A header that is present but invalid still rejects the request.
pub struct OptionalBearerAuth(pub Option<AuthContext>);

impl<S> FromRequestParts<S> for OptionalBearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(OptionalBearerAuth(None));
        }

        let BearerAuth(context) = BearerAuth::from_request_parts(parts, state).await?;
        Ok(OptionalBearerAuth(Some(context)))
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AuthError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| AuthError::unauthorized("Authorization header is not valid ASCII"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::unauthorized("Authorization scheme must be Bearer"))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::unauthorized("Empty Bearer token"));
    }

    Ok(token)
}
