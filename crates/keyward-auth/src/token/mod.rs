//! Token encoding, verification and lifecycle management.
//!
//! - Claim set and builder
//! - HS256 codec
//! - Denylist key scheme
//! - Token service (issue, verify, rotate, revoke)

pub mod claims;
pub mod codec;
pub mod revocation;
pub mod service;

pub use claims::{Claims, ClaimsBuilder, TokenUse};
pub use codec::{CodecError, CredentialCodec};
pub use revocation::{remaining_lifetime, revocation_key};
pub use service::{RevokeOutcome, TokenPair, TokenService};
