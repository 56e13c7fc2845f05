//! HTTP middleware for authentication and authorization.
//!
//! - Bearer token extraction and verification
//! - Typed request-scoped identity ([`AuthContext`])
//! - `AuthError` to HTTP response mapping
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use keyward_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn protected_handler(BearerAuth(auth): BearerAuth) -> String {
//!     format!("Hello, {}!", auth.subject())
//! }
//!
//! let app = Router::new()
//!     .route("/protected", get(protected_handler))
//!     .with_state(AuthState::new(token_service));
//! ```

pub mod auth;
pub mod error;
pub mod types;

pub use auth::{AuthState, BearerAuth, OptionalBearerAuth};
pub use types::AuthContext;
