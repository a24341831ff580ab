//! Forwarding tool calls to the backend API.

use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};
use url::Url;

use crate::credential::Credential;
use crate::error::{OpenApiError, Result};
use crate::mapping::{HttpMethod, RouteDecision};
use crate::provider::{ExtractedOperation, ParameterLocation};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Characters escaped in a substituted path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Transport options for [`BackendClient`].
#[derive(Debug, Clone)]
pub struct BackendOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Accept invalid TLS certificates (self-signed Central deployments).
    pub insecure_tls: bool,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            insecure_tls: false,
        }
    }
}

/// HTTP client for the backend API.
///
/// Each call is an independent request bounded by the configured timeout;
/// dropping the returned future cancels it.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: Url,
    client: reqwest::Client,
    credential: Credential,
    timeout: Duration,
}

impl BackendClient {
    /// Create a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`OpenApiError::InvalidUrl`] for an unparseable base URL and
    /// [`OpenApiError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, credential: Credential, options: BackendOptions) -> Result<Self> {
        let base_url = Url::parse(base_url)?;

        if options.insecure_tls {
            warn!(%base_url, "TLS certificate verification disabled for backend");
        }
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure_tls)
            .build()?;

        info!(%base_url, credential = credential.kind(), "Backend client ready");
        Ok(Self {
            base_url,
            client,
            credential,
            timeout: options.timeout,
        })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The credential attached to every call.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Build the full URL for `operation` from tool arguments.
    ///
    /// # Errors
    ///
    /// Returns [`OpenApiError::MissingParameter`] when a required path or
    /// query parameter is absent.
    pub fn build_url(
        &self,
        operation: &ExtractedOperation,
        args: &Map<String, Value>,
    ) -> Result<Url> {
        let mut path = operation.path().to_string();
        for param in &operation.parameters {
            if param.location != ParameterLocation::Path {
                continue;
            }
            match args.get(&param.name) {
                Some(value) => {
                    let encoded =
                        utf8_percent_encode(&value_to_string(value), PATH_SEGMENT).to_string();
                    path = path.replace(&format!("{{{}}}", param.name), &encoded);
                }
                None => return Err(OpenApiError::MissingParameter(param.name.clone())),
            }
        }

        let mut url = Url::parse(&format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        ))?;

        let mut query_params: Vec<(&str, String)> = Vec::new();
        for param in &operation.parameters {
            if param.location != ParameterLocation::Query {
                continue;
            }
            match args.get(&param.name) {
                Some(Value::Array(items)) => {
                    query_params.extend(
                        items
                            .iter()
                            .map(|v| (param.name.as_str(), value_to_string(v))),
                    );
                }
                Some(Value::Null) | None if param.required => {
                    return Err(OpenApiError::MissingParameter(param.name.clone()));
                }
                Some(Value::Null) | None => {}
                Some(value) => query_params.push((param.name.as_str(), value_to_string(value))),
            }
        }

        if !query_params.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in query_params {
                query_pairs.append_pair(key, &value);
            }
        }

        Ok(url)
    }

    /// Forward a call to an exposed operation.
    ///
    /// `args` must be a JSON object (or null). A `body` member becomes the
    /// JSON request body.
    ///
    /// # Errors
    ///
    /// - [`OpenApiError::ToolNotFound`] if the operation is not exposed
    /// - [`OpenApiError::InvalidArguments`] if `args` is not an object
    /// - [`OpenApiError::MissingParameter`] if a required parameter or body is absent
    /// - [`OpenApiError::Timeout`] / [`OpenApiError::Http`] on transport failure
    /// - [`OpenApiError::Api`] when the backend answers with an error status
    pub async fn execute(&self, operation: &ExtractedOperation, args: Value) -> Result<Value> {
        if operation.decision != RouteDecision::Tool {
            warn!(operation = %operation.operation, "Refusing to forward excluded operation");
            return Err(OpenApiError::ToolNotFound(operation.tool_name()));
        }

        let args = match args {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => {
                return Err(OpenApiError::InvalidArguments(
                    "arguments must be an object or null".to_string(),
                ));
            }
        };

        let url = self.build_url(operation, &args)?;
        debug!(method = %operation.method(), %url, "Forwarding call");

        let mut request = self.client.request(to_reqwest(operation.method()), url);
        request = self.credential.apply(request);

        if let Some(body) = args.get("body") {
            request = request.json(body);
        } else if operation.request_body_required {
            return Err(OpenApiError::MissingParameter("body".to_string()));
        }

        for param in &operation.parameters {
            if param.location != ParameterLocation::Header {
                continue;
            }
            match args.get(&param.name) {
                Some(Value::Null) | None if param.required => {
                    return Err(OpenApiError::MissingParameter(param.name.clone()));
                }
                Some(Value::Null) | None => {}
                Some(value) => request = request.header(&param.name, value_to_string(value)),
            }
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                OpenApiError::Timeout(self.timeout.as_secs())
            } else {
                OpenApiError::Http(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(operation = %operation.operation, %status, "Backend returned error status");
            return Err(OpenApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // JSON when possible, text otherwise
        Ok(serde_json::from_str(&body).unwrap_or_else(|_| json!(body)))
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Options => reqwest::Method::OPTIONS,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Trace => reqwest::Method::TRACE,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Operation;
    use crate::provider::ExtractedParameter;

    fn param(name: &str, location: ParameterLocation, required: bool) -> ExtractedParameter {
        ExtractedParameter {
            name: name.to_string(),
            location,
            required,
            description: None,
            schema: None,
        }
    }

    fn get_alert() -> ExtractedOperation {
        ExtractedOperation {
            operation: Operation::new(HttpMethod::Get, "/v1/alerts/{id}"),
            operation_id: Some("AlertService_GetAlert".to_string()),
            summary: None,
            description: None,
            parameters: vec![
                param("id", ParameterLocation::Path, true),
                param("query", ParameterLocation::Query, false),
            ],
            request_body_schema: None,
            request_body_required: false,
            decision: RouteDecision::Tool,
        }
    }

    fn client(base: &str) -> BackendClient {
        BackendClient::new(base, Credential::None, BackendOptions::default()).unwrap()
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_build_url_with_path_params() {
        let url = client("https://central.example.com")
            .build_url(&get_alert(), &args(json!({"id": "abc-123"})))
            .unwrap();
        assert_eq!(url.as_str(), "https://central.example.com/v1/alerts/abc-123");
    }

    #[test]
    fn test_path_params_are_encoded() {
        let url = client("https://central.example.com")
            .build_url(&get_alert(), &args(json!({"id": "a/b c"})))
            .unwrap();
        assert_eq!(url.path(), "/v1/alerts/a%2Fb%20c");
    }

    #[test]
    fn test_base_path_is_kept() {
        let url = client("https://central.example.com/api/")
            .build_url(&get_alert(), &args(json!({"id": 7, "query": "Severity:HIGH"})))
            .unwrap();
        assert_eq!(url.path(), "/api/v1/alerts/7");
        assert_eq!(url.query(), Some("query=Severity%3AHIGH"));
    }

    #[test]
    fn test_missing_required_param() {
        let result = client("https://central.example.com").build_url(&get_alert(), &Map::new());
        assert!(matches!(result, Err(OpenApiError::MissingParameter(p)) if p == "id"));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = BackendClient::new("not a url", Credential::None, BackendOptions::default());
        assert!(matches!(result, Err(OpenApiError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_excluded_operation_never_forwarded() {
        let mut op = get_alert();
        op.decision = RouteDecision::Exclude;

        let result = client("http://127.0.0.1:9").execute(&op, json!({"id": "1"})).await;
        assert!(matches!(result, Err(OpenApiError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_required_body_checked_before_sending() {
        let mut op = get_alert();
        op.request_body_schema = Some(json!({"type": "object"}));
        op.request_body_required = true;

        let result = client("http://127.0.0.1:9").execute(&op, json!({"id": "1"})).await;
        assert!(matches!(result, Err(OpenApiError::MissingParameter(p)) if p == "body"));
    }

    #[tokio::test]
    async fn test_required_header_checked_before_sending() {
        let mut op = get_alert();
        op.parameters.push(param("X-Request-Id", ParameterLocation::Header, true));

        let result = client("http://127.0.0.1:9").execute(&op, json!({"id": "1"})).await;
        assert!(matches!(result, Err(OpenApiError::MissingParameter(p)) if p == "X-Request-Id"));
    }

    #[tokio::test]
    async fn test_non_object_arguments_rejected() {
        let result = client("http://127.0.0.1:9").execute(&get_alert(), json!([1, 2])).await;
        assert!(matches!(result, Err(OpenApiError::InvalidArguments(_))));
    }
}
