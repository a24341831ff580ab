//! Gateway configuration from flags and environment variables.
//!
//! Every setting can be given as a flag or through the environment variable
//! the deployment already uses. Configuration is read once at startup and
//! passed explicitly to the components that need it.

use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use secrecy::{ExposeSecret, SecretString};
use stackrox_mcp_auth::{BearerAuthenticator, JwksClient, KeySetSource, TokenVerifier};
use stackrox_mcp_keys::{DEFAULT_KEY_ID, KeySetPublisher};
use stackrox_mcp_openapi::{ApiCatalog, BackendOptions, Credential, RouteConfig, RoutePlan};
use tracing::{info, warn};

use crate::error::CliResult;

/// Issuer StackRox writes into the tokens it mints.
pub const DEFAULT_ISSUER: &str = "https://stackrox.io/jwt";

/// Audience of StackRox API tokens.
pub const DEFAULT_AUDIENCE: &str = "https://stackrox.io/jwt-sources#api-tokens";

fn secret(value: &str) -> Result<SecretString, Infallible> {
    Ok(SecretString::from(value.to_string()))
}

/// Backend API connection settings.
#[derive(Debug, Clone, Args)]
pub struct BackendArgs {
    /// Backend base URL
    #[arg(long = "url", env = "ROX_MCP_URL", default_value = "https://localhost:8443")]
    pub url: String,

    /// API token; takes precedence over username and password
    #[arg(long, env = "ROX_MCP_TOKEN", value_parser = secret, hide_env_values = true)]
    pub rox_token: Option<SecretString>,

    /// Basic-auth username
    #[arg(long, env = "ROX_MCP_USERNAME", default_value = "admin")]
    pub username: String,

    /// Basic-auth password
    #[arg(long, env = "ROX_MCP_PASSWORD", value_parser = secret, hide_env_values = true)]
    pub password: Option<SecretString>,

    /// Accept invalid backend TLS certificates
    #[arg(long, env = "ROX_MCP_INSECURE_TLS")]
    pub insecure_tls: bool,

    /// Backend request timeout in seconds
    #[arg(long, env = "ROX_MCP_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl BackendArgs {
    /// The credential selected from the configured values.
    pub fn credential(&self) -> Credential {
        Credential::select(
            self.rox_token.as_ref().map(ExposeSecret::expose_secret),
            Some(self.username.as_str()),
            self.password.as_ref().map(ExposeSecret::expose_secret),
        )
    }

    /// Transport options for the backend client.
    pub fn options(&self) -> BackendOptions {
        BackendOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            insecure_tls: self.insecure_tls,
        }
    }
}

/// API description and route rule sources.
#[derive(Debug, Clone, Args)]
pub struct ApiArgs {
    /// API description file (Swagger 2.0 or OpenAPI 3, JSON or YAML)
    #[arg(long, env = "ROX_MCP_API_SPEC", default_value = "specs/stackrox-mcp-api-no-refs.json")]
    pub api_spec: PathBuf,

    /// Route rule file (YAML, JSON or TOML); built-in StackRox rules when absent
    #[arg(long, env = "ROX_MCP_ROUTES")]
    pub routes: Option<PathBuf>,
}

impl ApiArgs {
    /// Compile the configured route plan.
    pub fn route_plan(&self) -> CliResult<RoutePlan> {
        match &self.routes {
            Some(path) => load_route_plan(path),
            None => {
                info!("Using built-in StackRox route rules");
                Ok(RoutePlan::stackrox_default()?)
            }
        }
    }

    /// Load the API description and classify every operation.
    pub fn catalog(&self) -> CliResult<ApiCatalog> {
        let plan = self.route_plan()?;
        let catalog = ApiCatalog::from_file(&self.api_spec, &plan)?;
        info!(
            title = catalog.title(),
            version = catalog.version(),
            tools = catalog.tools().count(),
            excluded = catalog.excluded().count(),
            "Loaded API catalog"
        );
        Ok(catalog)
    }
}

/// Inbound token verification settings.
#[derive(Debug, Clone, Args)]
pub struct AuthArgs {
    /// Remote key-set URI
    #[arg(
        long,
        env = "FASTMCP_SERVER_AUTH_JWT_JWKS_URI",
        default_value = "http://localhost:8000/jwks.json"
    )]
    pub jwks_uri: String,

    /// Local key-set document; used instead of the remote URI when given
    #[arg(long)]
    pub jwks_file: Option<PathBuf>,

    /// Expected token issuer
    #[arg(long, env = "FASTMCP_SERVER_AUTH_JWT_ISSUER", default_value = DEFAULT_ISSUER)]
    pub issuer: String,

    /// Expected token audience
    #[arg(long, env = "FASTMCP_SERVER_AUTH_JWT_AUDIENCE", default_value = DEFAULT_AUDIENCE)]
    pub audience: String,

    /// Seconds of expiry leeway
    #[arg(long, default_value_t = 0)]
    pub clock_skew: u64,

    /// Seconds to cache the remote key set; 0 disables caching
    #[arg(long, default_value_t = 60)]
    pub jwks_cache_ttl: u64,
}

impl AuthArgs {
    /// Token verifier for the configured issuer and audience.
    pub fn verifier(&self) -> TokenVerifier {
        TokenVerifier::new(&self.issuer, &self.audience).with_clock_skew(self.clock_skew)
    }

    /// Key-set source: the local document when `--jwks-file` is set, the
    /// remote JWKS URI otherwise.
    ///
    /// # Errors
    ///
    /// Fails if the JWKS URI is unparseable or neither HTTPS nor local.
    pub fn key_set_source(&self) -> CliResult<Arc<dyn KeySetSource>> {
        Ok(match &self.jwks_file {
            Some(path) => Arc::new(KeySetPublisher::from_document(path)),
            None => Arc::new(JwksClient::with_ttl(
                &self.jwks_uri,
                Duration::from_secs(self.jwks_cache_ttl),
            )?),
        })
    }

    /// Bearer authenticator for the configured source and verifier.
    pub fn authenticator(&self) -> CliResult<BearerAuthenticator> {
        Ok(BearerAuthenticator::new(self.verifier(), self.key_set_source()?))
    }
}

/// Where key material is stored.
#[derive(Debug, Clone, Args)]
pub struct KeyStoreArgs {
    /// Private key file
    #[arg(long, env = "ROX_MCP_PRIVATE_KEY", default_value = "build/private_key.pem")]
    pub private_key: PathBuf,

    /// Key-set document file
    #[arg(long, env = "ROX_MCP_JWKS_FILE", default_value = "build/jwks.json")]
    pub jwks_file: PathBuf,

    /// Key id of the published key
    #[arg(long, default_value = DEFAULT_KEY_ID)]
    pub key_id: String,
}

impl KeyStoreArgs {
    /// Publisher serving the stored document, or one derived from the private key.
    pub fn publisher(&self, from_private_key: bool) -> KeySetPublisher {
        if from_private_key {
            KeySetPublisher::from_private_key(&self.private_key, &self.key_id)
        } else {
            KeySetPublisher::from_document(&self.jwks_file)
        }
    }
}

/// Listening address the key set is published on.
#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    /// Listen host
    #[arg(long, env = "MCP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port
    #[arg(long, env = "MCP_PORT", default_value_t = 8000)]
    pub port: u16,
}

impl ServerArgs {
    /// URI clients use to fetch the published key set.
    pub fn jwks_uri(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" | "" => "localhost",
            host => host,
        };
        format!("http://{host}:{}/jwks.json", self.port)
    }
}

/// Everything needed to build a [`Gateway`](crate::gateway::Gateway).
#[derive(Debug, Clone, Args)]
pub struct GatewayConfig {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub backend: BackendArgs,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub api: ApiArgs,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub auth: AuthArgs,
}

/// Load and compile a route rule file.
///
/// The format follows the file extension (`.yaml`, `.yml`, `.json`, `.toml`).
///
/// # Errors
///
/// Fails if the file cannot be read or parsed, or if any rule is invalid.
pub fn load_route_plan(path: &Path) -> CliResult<RoutePlan> {
    let rules: RouteConfig = config::Config::builder()
        .add_source(config::File::from(path))
        .build()?
        .try_deserialize()?;

    if rules.rules.is_empty() {
        warn!(path = %path.display(), "Route rule file has no rules; every operation is excluded");
    }

    let plan = RoutePlan::compile(rules.rules)?;
    info!(path = %path.display(), rules = plan.rules().len(), "Loaded route rules");
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use stackrox_mcp_openapi::{HttpMethod, Operation, RouteDecision};

    #[test]
    fn test_load_yaml_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.yaml");
        std::fs::write(
            &path,
            r#"
rules:
  - methods: [GET]
    pattern: "^/v1/clusters$"
    decision: Tool
  - decision: Exclude
"#,
        )
        .unwrap();

        let plan = load_route_plan(&path).unwrap();
        assert_eq!(plan.rules().len(), 2);
        assert_eq!(
            plan.classify(&Operation::new(HttpMethod::Get, "/v1/clusters")),
            RouteDecision::Tool
        );
    }

    #[test]
    fn test_load_toml_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.toml");
        std::fs::write(
            &path,
            r#"
[[rules]]
methods = ["GET"]
pattern = "^/v1/namespaces$"
decision = "tool"
"#,
        )
        .unwrap();

        let plan = load_route_plan(&path).unwrap();
        assert_eq!(
            plan.classify(&Operation::new(HttpMethod::Get, "/v1/namespaces")),
            RouteDecision::Tool
        );
        assert_eq!(
            plan.classify(&Operation::new(HttpMethod::Get, "/v1/secrets")),
            RouteDecision::Exclude
        );
    }

    #[test]
    fn test_invalid_rule_names_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        std::fs::write(
            &path,
            r#"{"rules": [
                {"methods": ["GET"], "pattern": "^/ok$", "decision": "Tool"},
                {"methods": ["GET"], "pattern": "^/v1/(broken$", "decision": "Tool"}
            ]}"#,
        )
        .unwrap();

        match load_route_plan(&path) {
            Err(CliError::Rules(err)) => assert_eq!(err.index, 1),
            other => panic!("expected rule error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_rule_file() {
        let result = load_route_plan(Path::new("/nonexistent/routes.yaml"));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_server_jwks_uri() {
        let any = ServerArgs {
            host: "0.0.0.0".into(),
            port: 8000,
        };
        assert_eq!(any.jwks_uri(), "http://localhost:8000/jwks.json");

        let named = ServerArgs {
            host: "mcp.internal".into(),
            port: 9000,
        };
        assert_eq!(named.jwks_uri(), "http://mcp.internal:9000/jwks.json");
    }
}
