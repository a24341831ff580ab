//! List how the route plan classifies every API operation.

use clap::Args;
use colored::Colorize;
use serde_json::json;
use stackrox_mcp_openapi::{ApiCatalog, RouteDecision};

use crate::cli::output::{OutputFormat, print_json};
use crate::config::ApiArgs;
use crate::error::CliResult;

/// List exposed and excluded operations
#[derive(Debug, Args)]
pub struct RoutesCommand {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub api: ApiArgs,

    /// Only list exposed operations
    #[arg(long)]
    pub exposed_only: bool,
}

impl RoutesCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Fails on invalid route rules or an unreadable API description.
    pub fn execute(self, format: OutputFormat) -> CliResult<()> {
        let catalog = self.api.catalog()?;
        self.render(&catalog, format)
    }

    fn render(&self, catalog: &ApiCatalog, format: OutputFormat) -> CliResult<()> {
        let operations = catalog
            .operations()
            .iter()
            .filter(|op| !self.exposed_only || op.decision == RouteDecision::Tool);

        if format.is_json() {
            let entries: Vec<_> = operations
                .map(|op| {
                    json!({
                        "method": op.method().as_str(),
                        "path": op.path(),
                        "tool": op.tool_name(),
                        "decision": op.decision.to_string(),
                    })
                })
                .collect();
            return print_json(&entries);
        }

        println!("{} {}", catalog.title().bold(), catalog.version());
        for op in operations {
            let decision = match op.decision {
                RouteDecision::Tool => "TOOL   ".green(),
                RouteDecision::Exclude => "EXCLUDE".dimmed(),
            };
            println!(
                "  {decision} {:<7} {}  {}",
                op.method().as_str(),
                op.path(),
                op.tool_name().dimmed()
            );
        }
        println!(
            "\n{} exposed, {} excluded",
            catalog.tools().count(),
            catalog.excluded().count()
        );
        Ok(())
    }
}
