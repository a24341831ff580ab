//! Print the published key set.

use clap::Args;
use colored::Colorize;
use stackrox_mcp_keys::KeySetLocation;

use crate::cli::output::{OutputFormat, print_json};
use crate::config::KeyStoreArgs;
use crate::error::CliResult;

/// Print the key-set document exactly as the publisher serves it
#[derive(Debug, Args)]
pub struct JwksCommand {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub store: KeyStoreArgs,

    /// Derive the document from the private key instead of the stored JWKS file
    #[arg(long)]
    pub from_private_key: bool,
}

impl JwksCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Fails if the stored key material exists but is unreadable or corrupt.
    pub fn execute(self, format: OutputFormat) -> CliResult<()> {
        let publisher = self.store.publisher(self.from_private_key);
        let document = publisher.publish()?;

        if !format.is_json() {
            let source = match publisher.location() {
                KeySetLocation::Document(path) => path.display().to_string(),
                KeySetLocation::PrivateKey { path, key_id } => {
                    format!("{} (kid {key_id})", path.display())
                }
            };
            if document.is_empty() {
                eprintln!(
                    "{} No key material at {source}; publishing an empty key set",
                    "!".yellow().bold()
                );
            } else {
                eprintln!("Publishing {} key(s) from {source}", document.keys.len());
            }
        }
        print_json(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_store_publishes_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = JwksCommand {
            store: KeyStoreArgs {
                private_key: dir.path().join("private_key.pem"),
                jwks_file: dir.path().join("jwks.json"),
                key_id: "jwtk0".into(),
            },
            from_private_key: false,
        };
        assert!(cmd.execute(OutputFormat::Json).is_ok());
    }

    #[test]
    fn test_corrupt_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let jwks_file = dir.path().join("jwks.json");
        std::fs::write(&jwks_file, "{not json").unwrap();

        let cmd = JwksCommand {
            store: KeyStoreArgs {
                private_key: dir.path().join("private_key.pem"),
                jwks_file,
                key_id: "jwtk0".into(),
            },
            from_private_key: false,
        };
        assert!(cmd.execute(OutputFormat::Json).is_err());
    }
}
