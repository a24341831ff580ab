//! # StackRox MCP API surface
//!
//! Decides which operations of the StackRox API are exposed as MCP tools and
//! forwards calls to the exposed ones.
//!
//! - [`RoutePlan`] classifies operations with ordered, first-match-wins
//!   method/path rules ending in a mandatory catch-all exclude
//! - [`ApiCatalog`] discovers operations from a Swagger 2.0 or OpenAPI 3
//!   description and applies the plan
//! - [`BackendClient`] forwards calls with the selected [`Credential`]
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use stackrox_mcp_openapi::{
//!     ApiCatalog, BackendClient, BackendOptions, Credential, RoutePlan,
//! };
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let plan = RoutePlan::stackrox_default()?;
//! let api_spec = Path::new("specs/stackrox-mcp-api-no-refs.json");
//! let catalog = ApiCatalog::from_file(api_spec, &plan)?;
//!
//! let credential = Credential::select(None, Some("admin"), Some("password"));
//! let options = BackendOptions::default();
//! let backend = BackendClient::new("https://localhost:8443", credential, options)?;
//!
//! if let Some(op) = catalog.find_tool("AlertService_ListAlerts") {
//!     let alerts = backend.execute(op, json!({"query": "Severity:HIGH"})).await?;
//!     println!("{alerts}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod backend;
mod credential;
mod error;
mod mapping;
mod parser;
mod provider;

pub use backend::{BackendClient, BackendOptions, DEFAULT_TIMEOUT_SECS};
pub use credential::Credential;
pub use error::{InvalidRuleError, OpenApiError, Result};
pub use mapping::{
    HttpMethod, MethodSet, Operation, RouteConfig, RouteDecision, RoutePlan, RouteRule,
    RouteRuleSpec, UnknownDecision, UnknownMethod, stackrox_default_rules,
};
pub use parser::{load_from_file, parse_document};
pub use provider::{
    ApiCatalog, ExtractedOperation, ExtractedParameter, ParameterLocation, ToolDefinition,
};
