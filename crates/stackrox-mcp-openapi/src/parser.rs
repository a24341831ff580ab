//! API description loading.
//!
//! Only the `paths` section and `info` are read, so both Swagger 2.0 and
//! OpenAPI 3.x documents are accepted without full schema validation.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{OpenApiError, Result};

/// Parse an API description from a string.
///
/// Detects JSON or YAML from the content.
pub fn parse_document(content: &str) -> Result<Value> {
    let document: Value = if content.trim_start().starts_with('{') {
        serde_json::from_str(content)?
    } else {
        serde_yaml::from_str(content)?
    };

    if !document.get("paths").is_some_and(Value::is_object) {
        return Err(OpenApiError::Parse(
            "document has no 'paths' object".to_string(),
        ));
    }
    Ok(document)
}

/// Load an API description from a file.
pub fn load_from_file(path: &Path) -> Result<Value> {
    debug!(path = %path.display(), "Loading API description");
    let content = std::fs::read_to_string(path)?;
    parse_document(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_SPEC_JSON: &str = r#"{
        "swagger": "2.0",
        "info": { "title": "API Reference", "version": "1" },
        "paths": {
            "/v1/alerts": {
                "get": { "operationId": "AlertService_ListAlerts" }
            }
        }
    }"#;

    const SIMPLE_SPEC_YAML: &str = r#"
openapi: "3.0.0"
info:
  title: API Reference
  version: "1"
paths:
  /v1/alerts:
    get:
      operationId: AlertService_ListAlerts
"#;

    #[test]
    fn test_parse_json() {
        let doc = parse_document(SIMPLE_SPEC_JSON).unwrap();
        assert_eq!(doc["info"]["title"], "API Reference");
        assert!(doc["paths"].get("/v1/alerts").is_some());
    }

    #[test]
    fn test_parse_yaml() {
        let doc = parse_document(SIMPLE_SPEC_YAML).unwrap();
        assert_eq!(doc["info"]["title"], "API Reference");
        assert!(doc["paths"].get("/v1/alerts").is_some());
    }

    #[test]
    fn test_missing_paths_rejected() {
        assert!(matches!(
            parse_document(r#"{"swagger": "2.0"}"#),
            Err(OpenApiError::Parse(_))
        ));
        assert!(parse_document("not valid: [").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_from_file(Path::new("/nonexistent/api.json"));
        assert!(matches!(result, Err(OpenApiError::Io(_))));
    }
}
