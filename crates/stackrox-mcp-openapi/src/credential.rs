//! Backend credential selection.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

/// Credential attached to every forwarded backend call.
///
/// Exactly one variant is active; secrets never appear in `Debug` output.
#[derive(Debug, Clone)]
pub enum Credential {
    /// `Authorization: Bearer <token>`
    Bearer(SecretString),
    /// `Authorization: Basic <base64(username:password)>`
    Basic {
        /// Username
        username: String,
        /// Password
        password: SecretString,
    },
    /// No `Authorization` header.
    None,
}

impl Credential {
    /// Pick the credential from the configured values.
    ///
    /// A non-empty token wins. Otherwise a non-empty username and password
    /// select basic auth. Anything else means unauthenticated access.
    pub fn select(token: Option<&str>, username: Option<&str>, password: Option<&str>) -> Self {
        fn non_empty(value: Option<&str>) -> Option<&str> {
            value.filter(|v| !v.is_empty())
        }

        match (non_empty(token), non_empty(username), non_empty(password)) {
            (Some(token), _, _) => Self::Bearer(SecretString::from(token.to_string())),
            (None, Some(username), Some(password)) => Self::Basic {
                username: username.to_string(),
                password: SecretString::from(password.to_string()),
            },
            _ => Self::None,
        }
    }

    /// Short name of the active variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bearer(_) => "bearer",
            Self::Basic { .. } => "basic",
            Self::None => "none",
        }
    }

    /// Attach the matching `Authorization` header to `request`.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Bearer(token) => request.bearer_auth(token.expose_secret()),
            Self::Basic { username, password } => {
                request.basic_auth(username, Some(password.expose_secret()))
            }
            Self::None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_always_wins() {
        assert!(matches!(
            Credential::select(Some("tok"), Some("admin"), Some("secret")),
            Credential::Bearer(t) if t.expose_secret() == "tok"
        ));
        assert!(matches!(
            Credential::select(Some("tok"), None, None),
            Credential::Bearer(_)
        ));
    }

    #[test]
    fn test_basic_needs_both_values() {
        assert!(matches!(
            Credential::select(None, Some("admin"), Some("secret")),
            Credential::Basic { username, .. } if username == "admin"
        ));
        assert!(matches!(
            Credential::select(Some(""), Some("admin"), Some("secret")),
            Credential::Basic { .. }
        ));
        assert!(matches!(
            Credential::select(None, Some("admin"), Some("")),
            Credential::None
        ));
        assert!(matches!(
            Credential::select(None, None, Some("secret")),
            Credential::None
        ));
    }

    #[test]
    fn test_nothing_set_is_none() {
        assert!(matches!(Credential::select(None, None, None), Credential::None));
        assert_eq!(Credential::select(None, None, None).kind(), "none");
    }

    #[test]
    fn test_debug_is_redacted() {
        let bearer = format!("{:?}", Credential::select(Some("super-secret"), None, None));
        let basic = format!("{:?}", Credential::select(None, Some("admin"), Some("hunter2")));

        assert!(!bearer.contains("super-secret"));
        assert!(!basic.contains("hunter2"));
        assert!(basic.contains("admin"));
    }
}
