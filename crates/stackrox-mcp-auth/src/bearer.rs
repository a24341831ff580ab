//! `Authorization: Bearer` handling for inbound requests.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::source::KeySetSource;
use crate::verifier::{TokenVerifier, now_unix};

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively and may be separated from the
/// token by any whitespace. Surrounding whitespace is ignored.
///
/// # Errors
///
/// [`AuthError::MissingCredentials`] if the header is absent or carries an
/// empty token, [`AuthError::InvalidScheme`] for any scheme but `Bearer`.
pub fn extract_bearer(header: Option<&str>) -> AuthResult<&str> {
    let header = header.map(str::trim).filter(|h| !h.is_empty());
    let Some(header) = header else {
        return Err(AuthError::MissingCredentials);
    };

    let (scheme, token) = header
        .split_once(char::is_whitespace)
        .unwrap_or((header, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}

/// Authenticates requests against a key-set source.
#[derive(Debug, Clone)]
pub struct BearerAuthenticator {
    verifier: TokenVerifier,
    source: Arc<dyn KeySetSource>,
}

impl BearerAuthenticator {
    /// Create an authenticator.
    pub fn new(verifier: TokenVerifier, source: Arc<dyn KeySetSource>) -> Self {
        Self { verifier, source }
    }

    /// The token verifier in use.
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Authenticate an `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Any [`AuthError`]: a missing or non-bearer header, an unavailable key
    /// set, or a token that fails verification.
    pub async fn authenticate(&self, authorization: Option<&str>) -> AuthResult<Claims> {
        let token = extract_bearer(authorization)?;
        self.authenticate_token(token).await
    }

    /// Authenticate a raw token.
    ///
    /// # Errors
    ///
    /// See [`BearerAuthenticator::authenticate`].
    pub async fn authenticate_token(&self, token: &str) -> AuthResult<Claims> {
        let keyset = self.source.key_set().await?;
        if keyset.is_empty() {
            warn!("No signing keys published; all tokens will be rejected");
        }

        let claims = self
            .verifier
            .verify_at(token, &keyset, now_unix())
            .inspect_err(|e| warn!(error = %e, "Bearer token rejected"))?;

        debug!(subject = ?claims.sub, "Request authenticated");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(extract_bearer(Some("bearer abc")).unwrap(), "abc");
        assert_eq!(extract_bearer(Some("BEARER   abc  ")).unwrap(), "abc");
    }

    #[test]
    fn test_extract_bearer_any_whitespace_separator() {
        assert_eq!(extract_bearer(Some("Bearer\tabc")).unwrap(), "abc");
        assert_eq!(extract_bearer(Some("Bearer \t abc")).unwrap(), "abc");
        assert!(matches!(
            extract_bearer(Some("Basic\tdXNlcjpwYXNz")),
            Err(AuthError::InvalidScheme)
        ));
    }

    #[test]
    fn test_extract_bearer_rejections() {
        assert!(matches!(
            extract_bearer(None),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            extract_bearer(Some("   ")),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            extract_bearer(Some("Bearer")),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            extract_bearer(Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidScheme)
        ));
    }
}
