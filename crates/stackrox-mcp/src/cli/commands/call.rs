//! Forward a single tool call.

use clap::Args;
use colored::Colorize;
use serde_json::Value;

use crate::cli::output::{OutputFormat, print_json};
use crate::config::GatewayConfig;
use crate::error::{CliError, CliResult};
use crate::gateway::Gateway;

/// Authenticate with a bearer token, then call an exposed tool
#[derive(Debug, Args)]
pub struct CallCommand {
    /// Tool name (operationId)
    pub tool: String,

    /// Bearer token presented by the caller
    #[arg(long)]
    pub token: String,

    /// Tool arguments as a JSON object
    #[arg(long, default_value = "{}")]
    pub args: String,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub gateway: GatewayConfig,
}

impl CallCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Fails on malformed arguments, rejected tokens, unknown tools or
    /// backend errors.
    pub async fn execute(self, format: OutputFormat) -> CliResult<()> {
        let args = parse_args(&self.args)?;
        let gateway = Gateway::from_config(&self.gateway)?;

        let authorization = format!("Bearer {}", self.token.trim());
        let result = gateway.call_tool(Some(&authorization), &self.tool, args).await?;

        if !format.is_json() {
            eprintln!("{} {}", "✓".green(), self.tool.bold());
        }
        print_json(&result)
    }
}

fn parse_args(raw: &str) -> CliResult<Value> {
    match serde_json::from_str(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(CliError::InvalidArguments("expected a JSON object".to_string())),
        Err(e) => Err(CliError::InvalidArguments(e.to_string())),
    }
}
