//! stackrox-mcp CLI entry point

use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = stackrox_mcp::cli::Cli::parse();

    if let Err(e) = cli.execute().await {
        let exit_code = stackrox_mcp::cli::error::display_error(&e);
        std::process::exit(exit_code);
    }
}
