//! Error types for API catalog and forwarding operations.

use thiserror::Error;

/// Result type for catalog and forwarding operations.
pub type Result<T> = std::result::Result<T, OpenApiError>;

/// Errors that can occur while loading the API description or forwarding calls.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpenApiError {
    /// Failed to reach the backend or the description URL.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse the API description.
    #[error("failed to parse API description: {0}")]
    Parse(String),

    /// Failed to read the API description file.
    #[error("failed to read API description file: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The backend answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// Missing required parameter.
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    /// Tool arguments are not a JSON object.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// No exposed operation has this tool name.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Request timed out.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),
}

impl From<serde_json::Error> for OpenApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for OpenApiError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// A route rule that failed validation.
///
/// Always fatal at startup; names the offending rule by its position in the
/// configured list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid route rule #{index} (pattern {pattern:?}): {reason}")]
pub struct InvalidRuleError {
    /// Zero-based position of the rule in the configured list.
    pub index: usize,
    /// The rule's pattern as configured.
    pub pattern: Option<String>,
    /// Why the rule was rejected.
    pub reason: String,
}

impl InvalidRuleError {
    pub(crate) fn new(index: usize, pattern: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            index,
            pattern: pattern.map(str::to_string),
            reason: reason.into(),
        }
    }
}
