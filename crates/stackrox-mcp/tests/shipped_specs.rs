//! The API description and rule file shipped under `specs/`.

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use stackrox_mcp::config::load_route_plan;
use stackrox_mcp_openapi::{ApiCatalog, RoutePlan};

fn specs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../specs")
}

fn exposed(catalog: &ApiCatalog) -> Vec<String> {
    catalog.tools().map(|op| op.tool_name()).collect()
}

#[test]
fn test_rule_file_matches_builtin_rules() {
    let api_spec = specs_dir().join("stackrox-mcp-api-no-refs.json");
    let from_file = load_route_plan(&specs_dir().join("routes.yaml")).unwrap();
    let builtin = RoutePlan::stackrox_default().unwrap();

    let a = ApiCatalog::from_file(&api_spec, &from_file).unwrap();
    let b = ApiCatalog::from_file(&api_spec, &builtin).unwrap();
    assert_eq!(exposed(&a), exposed(&b));
}

#[test]
fn test_destructive_operations_are_excluded() {
    let api_spec = specs_dir().join("stackrox-mcp-api-no-refs.json");
    let plan = RoutePlan::stackrox_default().unwrap();
    let catalog = ApiCatalog::from_file(&api_spec, &plan).unwrap();

    let excluded: Vec<_> = catalog.excluded().map(|op| op.tool_name()).collect();
    assert_eq!(
        excluded,
        vec![
            "AlertService_DeleteAlerts",
            "AlertService_ResolveAlert",
            "ClustersService_PostCluster",
            "PolicyService_DeletePolicy",
            "SecretService_ListSecrets",
        ]
    );
    assert!(catalog.find_tool("PolicyService_PutPolicy").is_some());
    assert!(catalog.find_tool("VulnerabilityRequestService_DeferVulnerability").is_some());
}
