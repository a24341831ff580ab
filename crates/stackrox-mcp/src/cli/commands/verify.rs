//! Verify a bearer token.

use clap::Args;
use colored::Colorize;

use crate::cli::output::{OutputFormat, print_json};
use crate::config::AuthArgs;
use crate::error::CliResult;

/// Verify a token against the configured key set and print its claims
#[derive(Debug, Args)]
pub struct VerifyCommand {
    /// Compact JWT to verify
    #[arg(long)]
    pub token: String,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub auth: AuthArgs,
}

impl VerifyCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Fails if the key set is unavailable or the token is rejected.
    pub async fn execute(self, format: OutputFormat) -> CliResult<()> {
        let authenticator = self.auth.authenticator()?;
        let claims = authenticator.authenticate_token(self.token.trim()).await?;

        if !format.is_json() {
            println!(
                "{} Token verified for {}",
                "✓".green(),
                claims.subject().unwrap_or("<no subject>").bold()
            );
        }
        print_json(&claims)
    }
}
