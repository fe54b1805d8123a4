//! Verification errors
//!
//! Every failure of [`TokenVerifier::verify`](crate::TokenVerifier::verify) maps
//! to exactly one variant. Errors are terminal for the request that produced
//! them; callers reject, they never retry.

use thiserror::Error;

/// Why a bearer token was rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum VerificationError {
    /// Issuer metadata or the JWK set could not be fetched or parsed
    #[error("issuer metadata unavailable: {0}")]
    MetadataUnavailable(String),

    /// The token is not a well-formed compact JWS
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// No key verifies the token signature
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The `exp` claim is in the past
    #[error("token expired")]
    TokenExpired,

    /// The `aud` claim does not contain the expected audience
    #[error("audience mismatch: expected {expected}")]
    AudienceMismatch {
        /// Audience the verifier was asked to enforce
        expected: String,
    },

    /// The `iss` claim does not equal the expected issuer
    #[error("issuer mismatch: expected {expected}, found {found}")]
    IssuerMismatch {
        /// Issuer the verifier was asked to enforce
        expected: String,
        /// Issuer found in the token (empty when absent)
        found: String,
    },
}

impl VerificationError {
    /// Short machine-readable code, used in `WWW-Authenticate` and logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::MetadataUnavailable(_) => "metadata_unavailable",
            Self::MalformedToken(_) => "malformed_token",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::TokenExpired => "token_expired",
            Self::AudienceMismatch { .. } => "audience_mismatch",
            Self::IssuerMismatch { .. } => "issuer_mismatch",
        }
    }

    /// Whether the failure lies with the identity provider rather than the token
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::MetadataUnavailable(_))
    }
}

/// Result alias for verification
pub type VerificationResult<T> = Result<T, VerificationError>;
