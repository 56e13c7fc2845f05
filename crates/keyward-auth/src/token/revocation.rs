//! Denylist key scheme and TTL alignment.
//!
//! Tokens are never stored verbatim: the key is the configured prefix
//! followed by the hex SHA-256 of the token string. An entry lives exactly
//! as long as the token it blocks.

use std::time::Duration;

use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use super::claims::Claims;

/// Builds the denylist key for a token.
#[must_use]
pub fn revocation_key(prefix: &str, token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{}{}", prefix, hex::encode(digest))
}

/// Remaining validity of a token at `now`, with sub-second precision.
///
/// Returns `None` once the token has expired; such a token needs no
/// denylist entry.
#[must_use]
pub fn remaining_lifetime(claims: &Claims, now: OffsetDateTime) -> Option<Duration> {
    let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp).ok()?;
    let left = expires_at - now;
    if left.is_positive() {
        Duration::try_from(left).ok()
    } else {
        None
    }
}
