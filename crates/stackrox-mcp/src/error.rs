//! Error types for the gateway and its CLI.

use stackrox_mcp_auth::AuthError;
use stackrox_mcp_keys::KeyError;
use stackrox_mcp_openapi::{InvalidRuleError, OpenApiError};
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = std::result::Result<T, CliError>;

/// Errors at the tool-calling boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The caller could not be authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    /// No exposed tool has this name.
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Forwarding to the backend failed.
    #[error("backend call failed: {0}")]
    Backend(#[from] OpenApiError),
}

/// CLI errors with user-facing suggestions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    /// Key generation, loading or storage failed.
    #[error("Key error: {0}")]
    Keys(#[from] KeyError),

    /// Token verification or key-set retrieval failed.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The API description could not be loaded or a call failed.
    #[error("API error: {0}")]
    Api(#[from] OpenApiError),

    /// A route rule is invalid.
    #[error("Route configuration error: {0}")]
    Rules(#[from] InvalidRuleError),

    /// The route rule file could not be read.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// Tool-calling boundary error.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Invalid command arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Suggestions for resolving the error.
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Keys(KeyError::Io { .. }) => vec![
                "Check that the private key path exists and is readable",
                "Run 'stackrox-mcp keys generate' to create a fresh key pair",
            ],
            Self::Keys(KeyError::InvalidPrivateKey { .. }) => {
                vec!["The key must be an unencrypted PKCS#8 or PKCS#1 PEM file"]
            }
            Self::Auth(AuthError::KeySetUnavailable(_)) => vec![
                "Check FASTMCP_SERVER_AUTH_JWT_JWKS_URI or pass --jwks-file",
                "Run 'stackrox-mcp jwks' to see what is being published",
            ],
            Self::Auth(_) | Self::Gateway(GatewayError::Unauthorized(_)) => vec![
                "Check the token's issuer and audience against FASTMCP_SERVER_AUTH_JWT_ISSUER and FASTMCP_SERVER_AUTH_JWT_AUDIENCE",
                "Tokens signed by a retired key are rejected; sign with a published key",
            ],
            Self::Rules(_) | Self::Config(_) => vec![
                "Each rule needs a decision of Tool or Exclude and a valid regex pattern",
                "Omit ROX_MCP_ROUTES to use the built-in StackRox rule list",
            ],
            Self::Gateway(GatewayError::ToolNotFound(_)) => {
                vec!["Run 'stackrox-mcp tools' to list exposed tools"]
            }
            Self::Api(OpenApiError::Io(_)) => {
                vec!["Check ROX_MCP_API_SPEC points at the API description file"]
            }
            Self::InvalidArguments(_) => vec![
                "Check argument format (must be a JSON object)",
                "Use --help to see expected format",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestions() {
        let err = CliError::Gateway(GatewayError::ToolNotFound("x".into()));
        assert_eq!(err.suggestions().len(), 1);

        let err = CliError::InvalidArguments("bad".into());
        assert!(!err.suggestions().is_empty());

        let err = CliError::Io(std::io::Error::other("disk full"));
        assert!(err.suggestions().is_empty());
    }

    #[test]
    fn test_gateway_error_display() {
        let err = CliError::from(GatewayError::ToolNotFound("delete_v1_alerts".into()));
        assert_eq!(err.to_string(), "tool not found: delete_v1_alerts");
    }
}
