//! Authentication error types.
//!
//! Every variant is a per-request rejection: it is reported to the caller as
//! an authentication failure and never retried.

use thiserror::Error;

/// Why a presented token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum VerificationError {
    /// The token is not a parseable compact JWS, or lacks a required header or claim.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The header names an algorithm other than RS256.
    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// No key with the token's key id is published.
    #[error("unknown signing key '{0}'")]
    UnknownKey(String),

    /// The published key for the token's key id is unusable.
    #[error("invalid published key '{kid}': {reason}")]
    InvalidKey {
        /// Key id of the unusable JWK.
        kid: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The signature does not verify under the published key.
    #[error("token signature does not verify")]
    BadSignature,

    /// The token expired.
    #[error("token expired at {expired_at} (now {now})")]
    Expired {
        /// `exp` claim.
        expired_at: u64,
        /// Verification time.
        now: u64,
    },

    /// The `iss` claim is not the expected issuer.
    #[error("issuer mismatch: expected {expected}, got {actual}")]
    IssuerMismatch {
        /// Configured issuer.
        expected: String,
        /// Issuer found in the token.
        actual: String,
    },

    /// The `aud` claim does not contain the expected audience.
    #[error("audience mismatch: token not issued for {expected}")]
    AudienceMismatch {
        /// Configured audience.
        expected: String,
    },
}

/// Errors raised while authenticating an inbound request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No `Authorization` header was presented.
    #[error("missing bearer token")]
    MissingCredentials,

    /// The `Authorization` header is not a `Bearer` credential.
    #[error("authorization header is not a bearer token")]
    InvalidScheme,

    /// The token was presented but failed verification.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// The key set could not be obtained.
    #[error("key set unavailable: {0}")]
    KeySetUnavailable(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;
