//! Command-line interface for the StackRox MCP gateway.
//!
//! ```text
//! cli/
//! ├── commands/     # One module per subcommand
//! ├── output.rs     # Human and JSON output
//! └── error.rs      # User-facing error display
//! ```

pub mod commands;
pub mod error;
pub mod output;

use std::io::{self, IsTerminal};

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::CliResult;

/// stackrox-mcp - keys, token verification and curated API tools for StackRox
#[derive(Parser, Debug)]
#[command(
    name = "stackrox-mcp",
    version,
    about = "StackRox MCP gateway: signing keys, bearer authentication and curated API tools",
    author
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: commands::Command,

    /// Enable verbose logging (-v, -vv, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "human", global = true)]
    pub format: output::OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`](crate::error::CliError) if the command fails.
    pub async fn execute(self) -> CliResult<()> {
        self.init_tracing();

        if self.no_color || !io::stdout().is_terminal() {
            colored::control::set_override(false);
        }

        self.command.execute(self.format).await
    }

    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Logs go to stderr so command output on stdout stays parseable.
    /// `RUST_LOG` takes precedence over `-v`.
    fn init_tracing(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.log_level()));

        // Already initialised when run in-process more than once
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::commands::Command;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["stackrox-mcp", "keys", "generate", "--out-dir", "out"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::try_parse_from(["stackrox-mcp", "-vvv", "jwks"]).unwrap();
        assert_eq!(cli.verbose, 3);
        assert_eq!(cli.log_level(), "trace");

        let cli = Cli::try_parse_from(["stackrox-mcp", "jwks"]).unwrap();
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let cli = Cli::try_parse_from(["stackrox-mcp", "-v", "--quiet", "jwks"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_call_requires_tool_name() {
        let cli = Cli::try_parse_from(["stackrox-mcp", "call", "--token", "t"]);
        assert!(cli.is_err());

        let cli = Cli::try_parse_from([
            "stackrox-mcp",
            "call",
            "ListAlerts",
            "--token",
            "t",
            "--args",
            r#"{"query":"Severity:HIGH"}"#,
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Call(ref cmd) if cmd.tool == "ListAlerts"));
    }

    #[test]
    fn test_json_format_flag() {
        let cli = Cli::try_parse_from(["stackrox-mcp", "--format", "json", "tools"]).unwrap();
        assert_eq!(cli.format, output::OutputFormat::Json);
    }
}
