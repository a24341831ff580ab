//! Key-set publication.
//!
//! [`KeySetPublisher::publish`] rereads storage on every call. Nothing is
//! cached, so replacing the key file takes effect on the next request without
//! a restart. When no key material exists the publisher serves the empty set
//! (`{"keys": []}`), against which every token fails verification.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{KeyError, Result};
use crate::jwk::{KeySetDocument, to_keyset};
use crate::keypair;

/// Where published key material is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySetLocation {
    /// A stored JWKS document (`jwks.json`).
    Document(PathBuf),
    /// A private key file; the document is derived from its public half.
    PrivateKey {
        /// PEM file holding the signing key.
        path: PathBuf,
        /// Key id to publish the key under.
        key_id: String,
    },
}

impl KeySetLocation {
    fn path(&self) -> &Path {
        match self {
            Self::Document(path) | Self::PrivateKey { path, .. } => path,
        }
    }
}

/// Serves the current key-set document.
#[derive(Debug, Clone)]
pub struct KeySetPublisher {
    location: KeySetLocation,
}

impl KeySetPublisher {
    /// Publish a stored JWKS document.
    pub fn from_document(path: impl Into<PathBuf>) -> Self {
        Self {
            location: KeySetLocation::Document(path.into()),
        }
    }

    /// Publish the public half of a stored private key under `key_id`.
    pub fn from_private_key(path: impl Into<PathBuf>, key_id: impl Into<String>) -> Self {
        Self {
            location: KeySetLocation::PrivateKey {
                path: path.into(),
                key_id: key_id.into(),
            },
        }
    }

    /// The configured storage location.
    pub fn location(&self) -> &KeySetLocation {
        &self.location
    }

    /// Load the key-set document as it exists in storage right now.
    ///
    /// A missing file yields the empty document. A file that exists but cannot
    /// be read or parsed is an error; it is never published as a valid key set.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Io`], [`KeyError::InvalidKeySet`] or
    /// [`KeyError::InvalidPrivateKey`] for unreadable or corrupt storage.
    pub fn publish(&self) -> Result<KeySetDocument> {
        let path = self.location.path();
        if !path.exists() {
            warn!(
                path = %path.display(),
                "No key material found, publishing empty key set"
            );
            return Ok(KeySetDocument::empty());
        }

        let document = match &self.location {
            KeySetLocation::Document(path) => read_document(path)?,
            KeySetLocation::PrivateKey { path, key_id } => {
                let key_pair = match keypair::load(path) {
                    Ok(key_pair) => key_pair,
                    // Removed between the existence check and the read.
                    Err(KeyError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                        return Ok(KeySetDocument::empty());
                    }
                    Err(e) => return Err(e),
                };
                to_keyset([key_pair.with_key_id(key_id.as_str()).public_jwk()])?
            }
        };

        debug!(
            path = %path.display(),
            keys = document.keys.len(),
            "Published key set"
        );
        Ok(document)
    }
}

fn read_document(path: &Path) -> Result<KeySetDocument> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(KeySetDocument::empty()),
        Err(e) => return Err(KeyError::io(path, e)),
    };

    let document: KeySetDocument =
        serde_json::from_str(&content).map_err(|e| KeyError::InvalidKeySet {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    document.validate()?;
    Ok(document)
}
