//! # StackRox MCP bearer authentication
//!
//! Verifies RS256 bearer tokens against a published key set.
//!
//! - [`verify`] / [`TokenVerifier`]: pure verification at a given time
//! - [`KeySetSource`]: where the key set comes from (local publisher or
//!   remote [`JwksClient`])
//! - [`BearerAuthenticator`]: header parsing plus verification
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stackrox_mcp_auth::{BearerAuthenticator, JwksClient, TokenVerifier};
//!
//! # tokio_test::block_on(async {
//! let verifier = TokenVerifier::new(
//!     "https://stackrox.io/jwt",
//!     "https://stackrox.io/jwt-sources#api-tokens",
//! );
//! let source = Arc::new(JwksClient::new("http://localhost:8000/jwks.json")?);
//! let auth = BearerAuthenticator::new(verifier, source);
//!
//! let claims = auth.authenticate(Some("Bearer eyJ...")).await?;
//! println!("caller: {:?}", claims.sub);
//! # Ok::<(), stackrox_mcp_auth::AuthError>(())
//! # });
//! ```

#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(clippy::all)]

mod bearer;
mod claims;
mod error;
mod jwks;
mod source;
mod verifier;

pub use bearer::{BearerAuthenticator, extract_bearer};
pub use claims::{Audience, Claims};
pub use error::{AuthError, AuthResult, VerificationError};
pub use jwks::{DEFAULT_CACHE_TTL, JwksClient};
pub use source::KeySetSource;
pub use verifier::{TokenVerifier, now_unix, verify};
