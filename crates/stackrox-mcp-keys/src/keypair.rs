//! RSA key material generation and loading.
//!
//! A [`KeyPair`] is the signing authority's view of the key: the private half
//! stays in memory (and in the owner-only PEM file the operator chooses to
//! write), the public half is what gets published as a JWK.

use std::fmt;
use std::path::Path;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::Serialize;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::error::{KeyError, Result};
use crate::jwk::{DEFAULT_KEY_ID, Jwk, to_jwk};

/// RSA modulus size in bits.
pub const KEY_BITS: usize = 2048;

/// RSA public exponent (F4).
pub const PUBLIC_EXPONENT: u32 = 65_537;

/// An RS256 signing keypair with the key id it is published under.
#[derive(Clone)]
pub struct KeyPair {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
    key_id: String,
}

// Never print private key material.
impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"<redacted>")
            .field("key_id", &self.key_id)
            .field("bits", &KEY_BITS)
            .finish()
    }
}

/// Generate a fresh RSA-2048 keypair under the default key id (`jwtk0`).
///
/// Uses the operating system CSPRNG. Failure is fatal for the caller; there is
/// no retry.
///
/// # Errors
///
/// Returns [`KeyError::Generation`] if the entropy source or the prime search fails.
pub fn generate() -> Result<KeyPair> {
    KeyPair::generate(DEFAULT_KEY_ID)
}

/// Reconstitute a keypair from a persisted private key file.
///
/// Accepts unencrypted PKCS#8 (`PRIVATE KEY`) PEM, and falls back to PKCS#1
/// (`RSA PRIVATE KEY`). The default key id is assigned; use
/// [`KeyPair::with_key_id`] to publish under another one.
///
/// # Errors
///
/// Returns [`KeyError::Io`] if the file cannot be read and
/// [`KeyError::InvalidPrivateKey`] if it does not contain an RSA private key.
pub fn load(path: impl AsRef<Path>) -> Result<KeyPair> {
    let path = path.as_ref();
    let pem = Zeroizing::new(std::fs::read_to_string(path).map_err(|e| KeyError::io(path, e))?);

    let private_key = match RsaPrivateKey::from_pkcs8_pem(&pem) {
        Ok(key) => key,
        Err(pkcs8_err) => RsaPrivateKey::from_pkcs1_pem(&pem).map_err(|_| {
            KeyError::InvalidPrivateKey {
                path: path.to_path_buf(),
                reason: pkcs8_err.to_string(),
            }
        })?,
    };

    debug!(path = %path.display(), "Loaded RSA private key");
    Ok(KeyPair::from_private_key(private_key, DEFAULT_KEY_ID))
}

impl KeyPair {
    /// Generate a fresh RSA-2048 keypair published under `key_id`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Generation`] if key generation fails.
    pub fn generate(key_id: impl Into<String>) -> Result<Self> {
        let mut rng = OsRng;
        let exponent = BigUint::from(PUBLIC_EXPONENT);
        let private_key = RsaPrivateKey::new_with_exp(&mut rng, KEY_BITS, &exponent)
            .map_err(|e| KeyError::Generation(e.to_string()))?;

        let key_pair = Self::from_private_key(private_key, key_id);
        info!(key_id = %key_pair.key_id, bits = KEY_BITS, "Generated RSA signing key");
        Ok(key_pair)
    }

    /// Wrap an existing RSA private key.
    pub fn from_private_key(private_key: RsaPrivateKey, key_id: impl Into<String>) -> Self {
        let public_key = RsaPublicKey::from(&private_key);
        Self {
            private_key,
            public_key,
            key_id: key_id.into(),
        }
    }

    /// Publish this key under a different key id.
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = key_id.into();
        self
    }

    /// Key id this key is published under.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Public half of the key.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Public half encoded as a JWK under this key's id.
    pub fn public_jwk(&self) -> Jwk {
        to_jwk(&self.public_key, &self.key_id)
    }

    /// Private half as unencrypted PKCS#8 PEM.
    ///
    /// The returned string is wiped from memory on drop.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Encoding`] if PEM encoding fails.
    pub fn private_key_pem(&self) -> Result<Zeroizing<String>> {
        self.private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| KeyError::Encoding(e.to_string()))
    }

    /// Sign `claims` as an RS256 compact JWT whose header carries this key's id.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Encoding`] if the key cannot be exported for the
    /// signer, or [`KeyError::Signing`] if serialization or signing fails.
    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String> {
        let der = self
            .private_key
            .to_pkcs1_der()
            .map_err(|e| KeyError::Encoding(e.to_string()))?;
        let encoding_key = EncodingKey::from_rsa_der(der.as_bytes());

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.key_id.clone());

        jsonwebtoken::encode(&header, claims, &encoding_key)
            .map_err(|e| KeyError::Signing(e.to_string()))
    }
}
