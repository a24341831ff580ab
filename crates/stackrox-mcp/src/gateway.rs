//! The tool-calling boundary.
//!
//! A [`Gateway`] ties together the three halves of the service: the bearer
//! authenticator guarding every call, the catalog of exposed operations, and
//! the backend client that forwards calls with the selected credential.

use std::sync::Arc;

use serde_json::Value;
use stackrox_mcp_auth::{BearerAuthenticator, Claims};
use stackrox_mcp_openapi::{ApiCatalog, BackendClient, ToolDefinition};
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::error::{CliResult, GatewayError};

/// Authenticated access to the curated backend tools.
#[derive(Debug, Clone)]
pub struct Gateway {
    catalog: Arc<ApiCatalog>,
    backend: BackendClient,
    authenticator: BearerAuthenticator,
}

impl Gateway {
    /// Assemble a gateway from its parts.
    pub fn new(
        catalog: ApiCatalog,
        backend: BackendClient,
        authenticator: BearerAuthenticator,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            backend,
            authenticator,
        }
    }

    /// Build a gateway from configuration.
    ///
    /// Loads the route rules and the API description, selects the backend
    /// credential, and picks the key-set source: the local document when
    /// `--jwks-file` is set, the remote JWKS URI otherwise.
    ///
    /// # Errors
    ///
    /// Fails on invalid route rules, an unreadable API description, an
    /// invalid backend URL, or a JWKS URI that is neither HTTPS nor local.
    pub fn from_config(config: &GatewayConfig) -> CliResult<Self> {
        let catalog = config.api.catalog()?;
        let backend = BackendClient::new(
            &config.backend.url,
            config.backend.credential(),
            config.backend.options(),
        )?;

        let authenticator = config.auth.authenticator()?;

        Ok(Self::new(catalog, backend, authenticator))
    }

    /// The catalog of discovered operations.
    pub fn catalog(&self) -> &ApiCatalog {
        &self.catalog
    }

    /// Authenticate an `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] for a missing or invalid token.
    pub async fn authorize(&self, authorization: Option<&str>) -> Result<Claims, GatewayError> {
        match self.authenticator.authenticate(authorization).await {
            Ok(claims) => {
                debug!(subject = claims.subject().unwrap_or("-"), "Caller authenticated");
                Ok(claims)
            }
            Err(e) => {
                warn!(error = %e, "Rejected caller");
                Err(GatewayError::Unauthorized(e))
            }
        }
    }

    /// List the exposed tools for an authenticated caller.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] if authentication fails.
    pub async fn list_tools(
        &self,
        authorization: Option<&str>,
    ) -> Result<Vec<ToolDefinition>, GatewayError> {
        self.authorize(authorization).await?;
        Ok(self.catalog.tool_definitions())
    }

    /// Authenticate, then forward a tool call to the backend.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Unauthorized`] if authentication fails
    /// - [`GatewayError::ToolNotFound`] for unknown or excluded tools
    /// - [`GatewayError::Backend`] if forwarding fails
    pub async fn call_tool(
        &self,
        authorization: Option<&str>,
        name: &str,
        args: Value,
    ) -> Result<Value, GatewayError> {
        let claims = self.authorize(authorization).await?;

        let Some(operation) = self.catalog.find_tool(name) else {
            warn!(tool = name, "Call to unknown or excluded tool");
            return Err(GatewayError::ToolNotFound(name.to_string()));
        };

        info!(
            tool = name,
            operation = %operation.operation,
            subject = claims.subject().unwrap_or("-"),
            "Forwarding tool call"
        );
        Ok(self.backend.execute(operation, args).await?)
    }
}
