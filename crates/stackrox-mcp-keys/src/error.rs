//! Error types for key material and key-set operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for key operations.
pub type Result<T> = std::result::Result<T, KeyError>;

/// Errors that can occur while generating, loading, encoding or publishing keys.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KeyError {
    /// Key generation failed (entropy source or arithmetic failure).
    ///
    /// This is fatal for the operation that requested the key; it is never retried.
    #[error("failed to generate RSA key: {0}")]
    Generation(String),

    /// Reading or writing key material failed.
    #[error("key file I/O error at {path}: {source}")]
    Io {
        /// File that could not be read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The private key file exists but does not hold a usable RSA key.
    #[error("invalid private key in {path}: {reason}")]
    InvalidPrivateKey {
        /// File that was parsed.
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },

    /// Encoding key material (PEM, DER, JSON) failed.
    #[error("failed to encode key material: {0}")]
    Encoding(String),

    /// A JWK could not be turned back into an RSA public key.
    #[error("invalid JWK '{kid}': {reason}")]
    InvalidJwk {
        /// Key id of the offending JWK.
        kid: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A key-set document was built from zero keys.
    #[error("a key set must contain at least one key")]
    EmptyKeySet,

    /// Two keys in one document share a key id.
    #[error("duplicate key id '{0}' in key set")]
    DuplicateKeyId(String),

    /// A stored key-set document could not be parsed.
    #[error("invalid key-set document in {path}: {reason}")]
    InvalidKeySet {
        /// File that was parsed.
        path: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },

    /// Signing a token failed.
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl KeyError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
