//! JSON Web Key encoding for RSA public keys (RFC 7517 / RFC 7518 §6.3).
//!
//! The encoding is deterministic: modulus and exponent are written as their
//! minimal big-endian unsigned byte strings, base64url-encoded with padding
//! stripped. Encoding the same public key twice yields byte-identical output.

use std::collections::HashSet;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};
use serde::{Deserialize, Serialize};

use crate::error::{KeyError, Result};

/// Key id used when none is configured.
pub const DEFAULT_KEY_ID: &str = "jwtk0";

/// A single RSA signing key in JWK form.
///
/// Field order matches the published document: `kty`, `use`, `kid`, `alg`, `n`, `e`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type (always `RSA`).
    pub kty: String,
    /// Intended use (always `sig`).
    #[serde(rename = "use")]
    pub key_use: String,
    /// Key id referenced by token headers.
    pub kid: String,
    /// Signature algorithm (always `RS256`).
    pub alg: String,
    /// Modulus, base64url without padding.
    pub n: String,
    /// Public exponent, base64url without padding.
    pub e: String,
}

impl Jwk {
    /// Rebuild the RSA public key described by this JWK.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidJwk`] if the key type is not RSA, a component
    /// is not valid base64url, or the components do not form a valid key.
    pub fn to_public_key(&self) -> Result<RsaPublicKey> {
        if self.kty != "RSA" {
            return Err(self.invalid(format!("unsupported key type '{}'", self.kty)));
        }

        let n = URL_SAFE_NO_PAD
            .decode(&self.n)
            .map_err(|e| self.invalid(format!("modulus is not base64url: {e}")))?;
        let e = URL_SAFE_NO_PAD
            .decode(&self.e)
            .map_err(|e| self.invalid(format!("exponent is not base64url: {e}")))?;

        RsaPublicKey::new(BigUint::from_bytes_be(&n), BigUint::from_bytes_be(&e))
            .map_err(|e| self.invalid(e.to_string()))
    }

    fn invalid(&self, reason: String) -> KeyError {
        KeyError::InvalidJwk {
            kid: self.kid.clone(),
            reason,
        }
    }
}

/// Encode an RSA public key as a signing JWK under `key_id`.
pub fn to_jwk(public_key: &RsaPublicKey, key_id: &str) -> Jwk {
    Jwk {
        kty: "RSA".to_string(),
        key_use: "sig".to_string(),
        kid: key_id.to_string(),
        alg: "RS256".to_string(),
        n: encode_biguint(public_key.n()),
        e: encode_biguint(public_key.e()),
    }
}

fn encode_biguint(value: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

/// A JWKS document: `{"keys": [...]}`.
///
/// Key ids are unique within a document. An empty document is valid and is
/// what gets published while no key material exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySetDocument {
    /// Published keys, in publication order.
    pub keys: Vec<Jwk>,
}

impl KeySetDocument {
    /// The empty key set. Every token verified against it fails.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the document holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Find the key published under `kid`.
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|jwk| jwk.kid == kid)
    }

    /// Add a key alongside the existing ones (rotation window).
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::DuplicateKeyId`] if the key id is already published.
    pub fn insert(&mut self, jwk: Jwk) -> Result<()> {
        if self.find(&jwk.kid).is_some() {
            return Err(KeyError::DuplicateKeyId(jwk.kid));
        }
        self.keys.push(jwk);
        Ok(())
    }

    /// Retire the key published under `kid`, returning it if it was present.
    pub fn remove(&mut self, kid: &str) -> Option<Jwk> {
        let index = self.keys.iter().position(|jwk| jwk.kid == kid)?;
        Some(self.keys.remove(index))
    }

    /// Check that no two keys share a key id.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::DuplicateKeyId`] naming the first repeated id.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.keys.len());
        for jwk in &self.keys {
            if !seen.insert(jwk.kid.as_str()) {
                return Err(KeyError::DuplicateKeyId(jwk.kid.clone()));
            }
        }
        Ok(())
    }
}

/// Wrap one or more JWKs into a key-set document.
///
/// # Errors
///
/// Returns [`KeyError::EmptyKeySet`] for an empty sequence and
/// [`KeyError::DuplicateKeyId`] if two keys share an id.
pub fn to_keyset(jwks: impl IntoIterator<Item = Jwk>) -> Result<KeySetDocument> {
    let document = KeySetDocument {
        keys: jwks.into_iter().collect(),
    };
    if document.is_empty() {
        return Err(KeyError::EmptyKeySet);
    }
    document.validate()?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn small_jwk(kid: &str) -> Jwk {
        Jwk {
            kty: "RSA".to_string(),
            key_use: "sig".to_string(),
            kid: kid.to_string(),
            alg: "RS256".to_string(),
            n: "sXch".to_string(),
            e: "AQAB".to_string(),
        }
    }

    #[test]
    fn test_exponent_encoding() {
        assert_eq!(encode_biguint(&BigUint::from(65_537u32)), "AQAB");
    }

    #[test]
    fn test_leading_zero_bytes_are_not_emitted() {
        // 0x00FF must encode as the single byte 0xFF.
        let value = BigUint::from_bytes_be(&[0x00, 0xFF]);
        assert_eq!(encode_biguint(&value), "_w");
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_string(&small_jwk("jwtk0")).unwrap();
        assert_eq!(
            json,
            r#"{"kty":"RSA","use":"sig","kid":"jwtk0","alg":"RS256","n":"sXch","e":"AQAB"}"#
        );
    }

    #[test]
    fn test_empty_document_serialization() {
        let json = serde_json::to_string(&KeySetDocument::empty()).unwrap();
        assert_eq!(json, r#"{"keys":[]}"#);
    }

    #[test]
    fn test_to_keyset_rejects_empty() {
        assert!(matches!(to_keyset(Vec::new()), Err(KeyError::EmptyKeySet)));
    }

    #[test]
    fn test_to_keyset_rejects_duplicate_kid() {
        let result = to_keyset([small_jwk("a"), small_jwk("a")]);
        assert!(matches!(result, Err(KeyError::DuplicateKeyId(kid)) if kid == "a"));
    }

    #[test]
    fn test_rotation_window() {
        let mut doc = to_keyset([small_jwk("old")]).unwrap();
        doc.insert(small_jwk("new")).unwrap();
        assert_eq!(doc.keys.len(), 2);
        assert!(doc.insert(small_jwk("new")).is_err());

        let retired = doc.remove("old").unwrap();
        assert_eq!(retired.kid, "old");
        assert!(doc.find("old").is_none());
        assert!(doc.find("new").is_some());
        assert!(doc.remove("old").is_none());
    }

    #[test]
    fn test_rejects_non_rsa_jwk() {
        let mut jwk = small_jwk("ec");
        jwk.kty = "EC".to_string();
        assert!(matches!(
            jwk.to_public_key(),
            Err(KeyError::InvalidJwk { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_base64() {
        let mut jwk = small_jwk("broken");
        jwk.n = "not base64!".to_string();
        assert!(jwk.to_public_key().is_err());
    }
}
