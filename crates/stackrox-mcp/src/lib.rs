//! # stackrox-mcp
//!
//! Gateway that exposes a curated subset of the StackRox Central API as MCP
//! tools behind bearer-token authentication.
//!
//! - [`config`]: flag and environment configuration, route rule files
//! - [`gateway`]: authenticate, list and call tools
//! - [`cli`]: the `stackrox-mcp` command line
//!
//! ```no_run
//! use clap::Parser;
//! use stackrox_mcp::config::GatewayConfig;
//! use stackrox_mcp::gateway::Gateway;
//!
//! #[derive(Parser)]
//! struct Args {
//!     #[command(flatten)]
//!     gateway: GatewayConfig,
//! }
//!
//! # async fn run() -> stackrox_mcp::error::CliResult<()> {
//! let gateway = Gateway::from_config(&Args::parse().gateway)?;
//! let tools = gateway.list_tools(Some("Bearer eyJ...")).await?;
//! println!("{} tools", tools.len());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;

pub use crate::config::GatewayConfig;
pub use crate::error::{CliError, CliResult, GatewayError};
pub use crate::gateway::Gateway;
