//! Tool catalog built from an API description and a route plan.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::mapping::{HttpMethod, Operation, RouteDecision, RoutePlan};
use crate::parser::{load_from_file, parse_document};

/// Where a parameter is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    /// Substituted into the path template.
    Path,
    /// Appended to the query string.
    Query,
    /// Sent as a request header.
    Header,
    /// Swagger 2.0 request body.
    Body,
}

impl ParameterLocation {
    /// Locations the backend client forwards. Cookie and form parameters are
    /// not, so they are left out of the tool's arguments.
    fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "body" => Some(Self::Body),
            _ => None,
        }
    }
}

/// A parameter extracted from an operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedParameter {
    /// Parameter name
    pub name: String,
    /// Where the parameter goes
    pub location: ParameterLocation,
    /// Whether the parameter is required
    pub required: bool,
    /// Description
    pub description: Option<String>,
    /// JSON Schema for the parameter
    pub schema: Option<Value>,
}

/// An operation extracted from the API description.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedOperation {
    /// Method and path template
    pub operation: Operation,
    /// Operation ID (if specified)
    pub operation_id: Option<String>,
    /// Summary
    pub summary: Option<String>,
    /// Operation description
    pub description: Option<String>,
    /// Path, query and header parameters
    pub parameters: Vec<ExtractedParameter>,
    /// Request body schema (if any)
    pub request_body_schema: Option<Value>,
    /// Whether a call must carry a body
    pub request_body_required: bool,
    /// How the route plan classified this operation
    pub decision: RouteDecision,
}

impl AsRef<Operation> for ExtractedOperation {
    fn as_ref(&self) -> &Operation {
        &self.operation
    }
}

impl ExtractedOperation {
    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.operation.method
    }

    /// Path template.
    pub fn path(&self) -> &str {
        &self.operation.path
    }

    /// Tool name: the operation ID, or `{method}_{path}` without one.
    pub fn tool_name(&self) -> String {
        self.operation_id.clone().unwrap_or_else(|| {
            let path_part = self
                .operation
                .path
                .trim_start_matches('/')
                .replace('/', "_")
                .replace(['{', '}'], "");
            format!(
                "{}_{}",
                self.operation.method.as_str().to_lowercase(),
                path_part
            )
        })
    }

    /// JSON Schema of the tool's arguments.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let mut param_schema = param.schema.clone().unwrap_or(json!({"type": "string"}));

            if let Some(desc) = &param.description
                && let Value::Object(ref mut map) = param_schema
            {
                map.insert("description".to_string(), json!(desc));
            }

            properties.insert(param.name.clone(), param_schema);

            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }

        if let Some(body_schema) = &self.request_body_schema {
            properties.insert("body".to_string(), body_schema.clone());
            if self.request_body_required {
                required.push(Value::String("body".to_string()));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }

    /// Tool descriptor for listing.
    pub fn to_tool(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.tool_name(),
            description: self.summary.clone().or_else(|| self.description.clone()),
            input_schema: self.input_schema(),
            method: self.operation.method.to_string(),
            path: self.operation.path.clone(),
        }
    }
}

/// Listing entry for an exposed tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema of the arguments
    pub input_schema: Value,
    /// HTTP method forwarded to
    pub method: String,
    /// Path template forwarded to
    pub path: String,
}

/// Every operation of an API description, classified by a route plan.
#[derive(Debug, Clone)]
pub struct ApiCatalog {
    title: String,
    version: String,
    operations: Vec<ExtractedOperation>,
}

impl ApiCatalog {
    /// Build a catalog from a parsed description.
    pub fn from_document(document: &Value, plan: &RoutePlan) -> Self {
        let info = document.get("info");
        let text = |key: &str| {
            info.and_then(|i| i.get(key))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let mut catalog = Self {
            title: text("title"),
            version: text("version"),
            operations: Vec::new(),
        };
        catalog.extract_operations(document, plan);

        info!(
            title = %catalog.title,
            operations = catalog.operations.len(),
            tools = catalog.tools().count(),
            "Built API catalog"
        );
        catalog
    }

    /// Build a catalog from description text.
    pub fn from_string(content: &str, plan: &RoutePlan) -> Result<Self> {
        Ok(Self::from_document(&parse_document(content)?, plan))
    }

    /// Build a catalog from a description file.
    pub fn from_file(path: &Path, plan: &RoutePlan) -> Result<Self> {
        Ok(Self::from_document(&load_from_file(path)?, plan))
    }

    /// API title from the description.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// API version from the description.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// All operations, in document order.
    pub fn operations(&self) -> &[ExtractedOperation] {
        &self.operations
    }

    /// Operations exposed as tools.
    pub fn tools(&self) -> impl Iterator<Item = &ExtractedOperation> {
        self.operations
            .iter()
            .filter(|op| op.decision == RouteDecision::Tool)
    }

    /// Operations hidden by the plan.
    pub fn excluded(&self) -> impl Iterator<Item = &ExtractedOperation> {
        self.operations
            .iter()
            .filter(|op| op.decision == RouteDecision::Exclude)
    }

    /// Descriptors of every exposed tool.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools().map(ExtractedOperation::to_tool).collect()
    }

    /// Exposed operation with this tool name.
    pub fn find_tool(&self, name: &str) -> Option<&ExtractedOperation> {
        self.tools().find(|op| op.tool_name() == name)
    }

    fn extract_operations(&mut self, document: &Value, plan: &RoutePlan) {
        let Some(paths) = document.get("paths").and_then(Value::as_object) else {
            return;
        };
        let mut seen_names = HashSet::new();

        for (path, path_item) in paths {
            let Some(path_item) = path_item.as_object() else {
                continue;
            };
            let shared_parameters = path_item.get("parameters");

            for method in HttpMethod::ALL {
                let key = method.as_str().to_ascii_lowercase();
                let Some(op) = path_item.get(&key).and_then(Value::as_object) else {
                    continue;
                };

                let operation = Operation::new(method, path.as_str());
                let decision = plan.classify(&operation);
                let extracted = extract_operation(operation, op, shared_parameters, decision);

                if decision == RouteDecision::Tool && !seen_names.insert(extracted.tool_name()) {
                    warn!(
                        tool = %extracted.tool_name(),
                        operation = %extracted.operation,
                        "Duplicate tool name; later operation is unreachable by name"
                    );
                }
                debug!(operation = %extracted.operation, %decision, "Classified operation");
                self.operations.push(extracted);
            }
        }
    }
}

fn extract_operation(
    operation: Operation,
    op: &Map<String, Value>,
    shared_parameters: Option<&Value>,
    decision: RouteDecision,
) -> ExtractedOperation {
    let text = |key: &str| op.get(key).and_then(Value::as_str).map(str::to_string);

    // Operation-level parameters override path-level ones with the same name and location.
    let mut parameters: Vec<ExtractedParameter> = Vec::new();
    let declared = shared_parameters
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .chain(op.get("parameters").and_then(Value::as_array).into_iter().flatten());
    for param in declared.filter_map(extract_parameter) {
        parameters.retain(|p| !(p.name == param.name && p.location == param.location));
        parameters.push(param);
    }

    // Swagger 2.0 carries the body as an `in: body` parameter.
    let mut request_body_schema = None;
    let mut request_body_required = false;
    parameters.retain(|p| {
        if p.location == ParameterLocation::Body {
            request_body_schema = Some(p.schema.clone().unwrap_or_else(|| json!({})));
            request_body_required = p.required;
            false
        } else {
            true
        }
    });

    if request_body_schema.is_none()
        && let Some(request_body) = op.get("requestBody")
    {
        request_body_schema = request_body
            .get("content")
            .and_then(|c| c.get("application/json"))
            .and_then(|mt| mt.get("schema"))
            .cloned();
        request_body_required = request_body_schema.is_some()
            && request_body
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false);
    }

    ExtractedOperation {
        operation,
        operation_id: text("operationId"),
        summary: text("summary"),
        description: text("description"),
        parameters,
        request_body_schema,
        request_body_required,
        decision,
    }
}

fn extract_parameter(param: &Value) -> Option<ExtractedParameter> {
    let name = param.get("name")?.as_str()?.to_string();
    let declared = param.get("in")?.as_str()?;
    let Some(location) = ParameterLocation::parse(declared) else {
        debug!(parameter = %name, location = declared, "Skipping parameter not forwarded");
        return None;
    };
    let required = location == ParameterLocation::Path
        || param.get("required").and_then(Value::as_bool).unwrap_or(false);

    // OpenAPI 3 nests the schema; Swagger 2.0 puts type information inline.
    let schema = param.get("schema").cloned().or_else(|| {
        let inline: Map<String, Value> = ["type", "format", "items", "enum", "default"]
            .into_iter()
            .filter_map(|k| param.get(k).map(|v| (k.to_string(), v.clone())))
            .collect();
        (!inline.is_empty()).then_some(Value::Object(inline))
    });

    Some(ExtractedParameter {
        name,
        location,
        required,
        description: param
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        schema,
    })
}
