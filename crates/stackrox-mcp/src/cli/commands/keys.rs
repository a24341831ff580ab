//! Signing key generation.
//!
//! Writes the private key and its key-set document into an output directory
//! (`build/` by default), either from a fresh keypair or from an existing
//! private key.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use colored::Colorize;
use serde_json::json;
use stackrox_mcp_keys::{DEFAULT_KEY_ID, KeyPair, KeySetDocument, store, to_keyset};

use crate::cli::output::{OutputFormat, print_json};
use crate::config::{DEFAULT_AUDIENCE, DEFAULT_ISSUER, ServerArgs};
use crate::error::CliResult;

/// File name of the stored private key.
pub const PRIVATE_KEY_FILE: &str = "private_key.pem";

/// File name of the stored key-set document.
pub const JWKS_FILE: &str = "jwks.json";

/// Key management commands
#[derive(Debug, Subcommand)]
pub enum KeysCommand {
    /// Generate a fresh RSA-2048 keypair and its key-set document
    Generate(GenerateArgs),

    /// Derive the key-set document from an existing private key
    FromExisting(FromExistingArgs),
}

/// Arguments for `keys generate`
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Output directory
    #[arg(short, long, default_value = "build")]
    pub out_dir: PathBuf,

    /// Key id to publish the key under
    #[arg(long, default_value = DEFAULT_KEY_ID)]
    pub key_id: String,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub server: ServerArgs,
}

/// Arguments for `keys from-existing`
#[derive(Debug, Args)]
pub struct FromExistingArgs {
    /// Existing private key (PKCS#8 or PKCS#1 PEM)
    #[arg(short = 'k', long)]
    pub private_key: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "build")]
    pub out_dir: PathBuf,

    /// Key id to publish the key under
    #[arg(long, default_value = DEFAULT_KEY_ID)]
    pub key_id: String,
}

impl KeysCommand {
    /// Execute the key command.
    ///
    /// # Errors
    ///
    /// Fails if generation, loading or writing key material fails.
    pub fn execute(self, format: OutputFormat) -> CliResult<()> {
        match self {
            Self::Generate(args) => args.execute(format),
            Self::FromExisting(args) => args.execute(format),
        }
    }
}

impl GenerateArgs {
    fn execute(self, format: OutputFormat) -> CliResult<()> {
        if !format.is_json() {
            println!("Generating RSA key pair for JWT authentication...");
        }

        let key_pair = KeyPair::generate(&self.key_id)?;
        let private_key_path = self.out_dir.join(PRIVATE_KEY_FILE);
        store::write_private_key(&private_key_path, &key_pair.private_key_pem()?)?;

        let (jwks_path, document) = write_document(&key_pair, &self.out_dir)?;

        if format.is_json() {
            return print_json(&json!({
                "private_key": private_key_path,
                "jwks_file": jwks_path,
                "jwks": document,
            }));
        }

        println!("{} Private key saved to {}", "✓".green(), private_key_path.display());
        println!("{} JWKS file saved to {}", "✓".green(), jwks_path.display());

        println!("\n{}", "Generated files:".bold());
        println!("  - {}: private key for signing JWTs", private_key_path.display());
        println!("  - {}: public key set for JWT verification", jwks_path.display());

        print_document(&document)?;

        println!("\n{}", "To use these keys:".bold());
        println!("  1. Keep {PRIVATE_KEY_FILE} secure and use it to sign JWTs");
        println!("  2. Make {JWKS_FILE} available at the JWKS URI endpoint");
        println!("  3. Set the verifier environment:");
        println!("     FASTMCP_SERVER_AUTH_JWT_JWKS_URI={}", self.server.jwks_uri());
        println!("     FASTMCP_SERVER_AUTH_JWT_ISSUER={DEFAULT_ISSUER}");
        println!("     FASTMCP_SERVER_AUTH_JWT_AUDIENCE={DEFAULT_AUDIENCE}");

        println!("\nTo regenerate the key set from an existing private key, run:");
        println!("  stackrox-mcp keys from-existing --private-key path/to/key.pem");
        Ok(())
    }
}

impl FromExistingArgs {
    fn execute(self, format: OutputFormat) -> CliResult<()> {
        if !format.is_json() {
            println!("Generating JWKS from existing private key...");
        }

        let key_pair = stackrox_mcp_keys::load(&self.private_key)?.with_key_id(&self.key_id);
        let (jwks_path, document) = write_document(&key_pair, &self.out_dir)?;

        if format.is_json() {
            return print_json(&json!({
                "private_key": self.private_key,
                "jwks_file": jwks_path,
                "jwks": document,
            }));
        }

        println!(
            "{} JWKS generated from existing private key: {}",
            "✓".green(),
            self.private_key.display()
        );
        println!("{} JWKS saved to {}", "✓".green(), jwks_path.display());
        print_document(&document)
    }
}

fn write_document(key_pair: &KeyPair, out_dir: &Path) -> CliResult<(PathBuf, KeySetDocument)> {
    let document = to_keyset([key_pair.public_jwk()])?;
    let path = out_dir.join(JWKS_FILE);
    store::write_key_set(&path, &document)?;
    Ok((path, document))
}

fn print_document(document: &KeySetDocument) -> CliResult<()> {
    println!("\n{}", "JWKS content:".bold());
    print_json(document)
}
