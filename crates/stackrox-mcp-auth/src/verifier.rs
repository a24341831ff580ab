//! RS256 bearer token verification against a key-set document.
//!
//! # Verification order
//!
//! 1. Decode the unverified header; require `alg = RS256` and a `kid`.
//! 2. Look the `kid` up in the key set. A key missing from the set (never
//!    published, or retired by rotation) rejects the token.
//! 3. Rebuild the RSA key from the JWK's `n`/`e` and verify the signature.
//! 4. Check `exp`, then `iss`, then `aud`.
//!
//! Verification is a pure function of its inputs: the current time is passed
//! in, nothing is cached and nothing is retried.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use stackrox_mcp_keys::KeySetDocument;
use tracing::{debug, warn};

use crate::claims::Claims;
use crate::error::VerificationError;

/// Verify `token` against `keyset` at Unix time `now`.
///
/// The token must be unexpired (`exp > now`), issued by `expected_issuer`, and
/// include `expected_audience` in its `aud` claim.
///
/// # Errors
///
/// Returns the first [`VerificationError`] encountered in the order described
/// in the module documentation.
pub fn verify(
    token: &str,
    keyset: &KeySetDocument,
    expected_issuer: &str,
    expected_audience: &str,
    now: u64,
) -> Result<Claims, VerificationError> {
    TokenVerifier::new(expected_issuer, expected_audience).verify_at(token, keyset, now)
}

/// Current Unix time in seconds.
///
/// A clock before the epoch reports `u64::MAX`, which makes every token expired.
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(u64::MAX, |elapsed| elapsed.as_secs())
}

/// Token verifier bound to an expected issuer and audience.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    expected_issuer: String,
    expected_audience: String,
    leeway_secs: u64,
}

impl TokenVerifier {
    /// Create a verifier with no clock-skew leeway.
    pub fn new(expected_issuer: impl Into<String>, expected_audience: impl Into<String>) -> Self {
        Self {
            expected_issuer: expected_issuer.into(),
            expected_audience: expected_audience.into(),
            leeway_secs: 0,
        }
    }

    /// Accept tokens up to `leeway_secs` past their `exp`.
    #[must_use]
    pub fn with_clock_skew(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// The expected issuer.
    pub fn expected_issuer(&self) -> &str {
        &self.expected_issuer
    }

    /// The expected audience.
    pub fn expected_audience(&self) -> &str {
        &self.expected_audience
    }

    /// Verify `token` against `keyset` at the current system time.
    ///
    /// # Errors
    ///
    /// See [`TokenVerifier::verify_at`].
    pub fn verify(
        &self,
        token: &str,
        keyset: &KeySetDocument,
    ) -> Result<Claims, VerificationError> {
        self.verify_at(token, keyset, now_unix())
    }

    /// Verify `token` against `keyset` at Unix time `now`.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError`] describing the first failed check.
    pub fn verify_at(
        &self,
        token: &str,
        keyset: &KeySetDocument,
        now: u64,
    ) -> Result<Claims, VerificationError> {
        let header = decode_header(token).map_err(|e| {
            debug!(error = %e, "Failed to decode JWT header");
            VerificationError::MalformedToken(format!("invalid header: {e}"))
        })?;

        if header.alg != Algorithm::RS256 {
            warn!(algorithm = ?header.alg, "JWT algorithm not allowed");
            return Err(VerificationError::UnsupportedAlgorithm(format!(
                "{:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| VerificationError::MalformedToken("header has no kid".to_string()))?;

        let jwk = keyset.find(&kid).ok_or_else(|| {
            warn!(key_id = %kid, published = keyset.keys.len(), "Key ID not found in key set");
            VerificationError::UnknownKey(kid.clone())
        })?;

        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(|e| {
            VerificationError::InvalidKey {
                kid: kid.clone(),
                reason: e.to_string(),
            }
        })?;

        // Registered claims are checked below against the caller's clock.
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => {
                    warn!(key_id = %kid, "JWT signature verification failed");
                    VerificationError::BadSignature
                }
                ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                    VerificationError::InvalidKey {
                        kid: kid.clone(),
                        reason: e.to_string(),
                    }
                }
                _ => VerificationError::MalformedToken(e.to_string()),
            })?
            .claims;

        self.check_claims(&claims, now)?;

        debug!(
            key_id = %kid,
            subject = ?claims.sub,
            issuer = %self.expected_issuer,
            "JWT verification successful"
        );
        Ok(claims)
    }

    fn check_claims(&self, claims: &Claims, now: u64) -> Result<(), VerificationError> {
        let exp = claims
            .exp
            .ok_or_else(|| VerificationError::MalformedToken("missing exp claim".to_string()))?;
        // NumericDate may be fractional
        if exp + self.leeway_secs as f64 <= now as f64 {
            warn!(exp, now, "JWT expired");
            return Err(VerificationError::Expired {
                expired_at: exp.floor() as u64,
                now,
            });
        }

        let issuer = claims
            .iss
            .as_deref()
            .ok_or_else(|| VerificationError::MalformedToken("missing iss claim".to_string()))?;
        if issuer != self.expected_issuer {
            warn!(expected = %self.expected_issuer, actual = %issuer, "JWT issuer mismatch");
            return Err(VerificationError::IssuerMismatch {
                expected: self.expected_issuer.clone(),
                actual: issuer.to_string(),
            });
        }

        let audience = claims
            .aud
            .as_ref()
            .ok_or_else(|| VerificationError::MalformedToken("missing aud claim".to_string()))?;
        if !audience.contains(&self.expected_audience) {
            warn!(expected = %self.expected_audience, "JWT audience mismatch");
            return Err(VerificationError::AudienceMismatch {
                expected: self.expected_audience.clone(),
            });
        }

        Ok(())
    }
}
