//! CLI command implementations.

pub mod call;
pub mod jwks;
pub mod keys;
pub mod routes;
pub mod tools;
pub mod verify;

use clap::Subcommand;

use crate::cli::output::OutputFormat;
use crate::error::CliResult;

/// All available CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate or derive JWT signing keys
    #[command(subcommand)]
    Keys(keys::KeysCommand),

    /// Print the key set the publisher serves
    Jwks(jwks::JwksCommand),

    /// List exposed and excluded API operations
    #[command(visible_alias = "r")]
    Routes(routes::RoutesCommand),

    /// Verify a bearer token and print its claims
    Verify(verify::VerifyCommand),

    /// List exposed tools
    #[command(visible_alias = "t")]
    Tools(tools::ToolsCommand),

    /// Authenticate, then forward a tool call to the backend
    Call(call::CallCommand),
}

impl Command {
    /// Execute the command with the specified output format
    pub async fn execute(self, format: OutputFormat) -> CliResult<()> {
        match self {
            Command::Keys(cmd) => cmd.execute(format),
            Command::Jwks(cmd) => cmd.execute(format),
            Command::Routes(cmd) => cmd.execute(format),
            Command::Verify(cmd) => cmd.execute(format).await,
            Command::Tools(cmd) => cmd.execute(format),
            Command::Call(cmd) => cmd.execute(format).await,
        }
    }
}
