//! JWT claim set carried by inbound bearer tokens.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The `aud` claim, which RFC 7519 allows as a single string or an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// `"aud": "value"`
    Single(String),
    /// `"aud": ["a", "b"]`
    Multiple(Vec<String>),
}

impl Audience {
    /// Whether `audience` is among the token's audiences.
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Self::Single(value) => value == audience,
            Self::Multiple(values) => values.iter().any(|v| v == audience),
        }
    }
}

/// Decoded claims of a verified token.
///
/// Time claims are RFC 7519 NumericDates, which may carry a fractional part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer (`iss`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Subject (`sub`): the caller's identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Audience (`aud`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,

    /// Expiry (`exp`), Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<f64>,

    /// Issued at (`iat`), Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<f64>,

    /// Not before (`nbf`), Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<f64>,

    /// Claims outside RFC 7519's registered set.
    #[serde(flatten)]
    pub additional: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// The token subject, if present.
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }
}
