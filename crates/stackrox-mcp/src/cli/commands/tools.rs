//! List the exposed tools.

use clap::Args;
use colored::Colorize;

use crate::cli::output::{OutputFormat, print_json};
use crate::config::ApiArgs;
use crate::error::CliResult;

/// List exposed tools with their input schemas
#[derive(Debug, Args)]
pub struct ToolsCommand {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub api: ApiArgs,
}

impl ToolsCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Fails on invalid route rules or an unreadable API description.
    pub fn execute(self, format: OutputFormat) -> CliResult<()> {
        let tools = self.api.catalog()?.tool_definitions();

        if format.is_json() {
            return print_json(&tools);
        }

        if tools.is_empty() {
            println!("{} No operations are exposed as tools", "!".yellow().bold());
            return Ok(());
        }
        for tool in &tools {
            println!("{} {} {}", tool.name.bold(), tool.method, tool.path.dimmed());
            if let Some(description) = &tool.description {
                println!("    {description}");
            }
        }
        Ok(())
    }
}
