//! HS256 credential codec.
//!
//! Pure transformation between [`Claims`] and compact JWTs. The codec checks
//! the MAC and the structure only; time bounds, issuer and token use are the
//! caller's business.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::claims::Claims;

/// Codec failures.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Claims could not be serialized or signed.
    #[error("Token encoding failed: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },

    /// The MAC does not verify (wrong secret or tampered token).
    #[error("Token signature is invalid")]
    SignatureInvalid,

    /// The token cannot be parsed into a claim set.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the structural problem.
        message: String,
    },
}

impl CodecError {
    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for CodecError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::SignatureInvalid,
            _ => Self::malformed(err.to_string()),
        }
    }
}

/// Signs and verifies tokens with a single symmetric secret.
///
/// Thread-safe (`Send + Sync`); share one instance per secret.
#[derive(Clone)]
pub struct CredentialCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl CredentialCodec {
    /// Creates a codec for the given secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Encodes claims into a signed token.
    ///
    /// Identical claims always produce the identical token.
    ///
    /// # Errors
    /// Returns `CodecError::Encoding` if the claims are not well-formed or
    /// serialization fails.
    pub fn encode(&self, claims: &Claims) -> Result<String, CodecError> {
        if !claims.is_well_formed() {
            return Err(CodecError::encoding(
                "claims must satisfy nbf <= iat < exp",
            ));
        }

        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| CodecError::encoding(e.to_string()))
    }

    /// Decodes a token and verifies its signature.
    ///
    /// Expired and not-yet-valid tokens decode successfully.
    ///
    /// # Errors
    /// Returns `CodecError::SignatureInvalid` on MAC mismatch and
    /// `CodecError::Malformed` for everything else that prevents parsing.
    pub fn decode(&self, token: &str) -> Result<Claims, CodecError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        let claims = data.claims;

        if !claims.is_well_formed() {
            return Err(CodecError::malformed("claims violate nbf <= iat < exp"));
        }

        Ok(claims)
    }
}
