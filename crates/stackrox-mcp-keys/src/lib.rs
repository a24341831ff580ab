//! # StackRox MCP key material
//!
//! RS256 signing keys and the JWKS document that publishes them.
//!
//! - [`generate`] / [`load`] produce a [`KeyPair`] (RSA-2048, e = 65537)
//! - [`to_jwk`] / [`to_keyset`] encode public keys as a [`KeySetDocument`]
//! - [`KeySetPublisher`] serves the document from storage on demand
//! - [`store`] persists key files atomically
//!
//! # Example
//!
//! ```rust,no_run
//! use stackrox_mcp_keys::{KeySetPublisher, generate, store, to_keyset};
//!
//! let key_pair = generate()?;
//! store::write_private_key("build/private_key.pem", &key_pair.private_key_pem()?)?;
//! store::write_key_set("build/jwks.json", &to_keyset([key_pair.public_jwk()])?)?;
//!
//! let published = KeySetPublisher::from_document("build/jwks.json").publish()?;
//! assert_eq!(published.keys.len(), 1);
//! # Ok::<(), stackrox_mcp_keys::KeyError>(())
//! ```

#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]

mod error;
mod jwk;
mod keypair;
mod publisher;
pub mod store;

pub use error::{KeyError, Result};
pub use jwk::{DEFAULT_KEY_ID, Jwk, KeySetDocument, to_jwk, to_keyset};
pub use keypair::{KEY_BITS, KeyPair, PUBLIC_EXPONENT, generate, load};
pub use publisher::{KeySetLocation, KeySetPublisher};
