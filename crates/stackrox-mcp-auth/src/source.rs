//! Where the verifier gets its key set from.

use std::fmt::Debug;

use async_trait::async_trait;
use stackrox_mcp_keys::{KeySetDocument, KeySetPublisher};

use crate::error::{AuthError, AuthResult};
use crate::jwks::JwksClient;

/// A provider of the currently published key set.
///
/// Implementations must return the set as of the call: a key removed from
/// storage stops verifying tokens once the source reflects the removal.
#[async_trait]
pub trait KeySetSource: Send + Sync + Debug {
    /// The current key set.
    async fn key_set(&self) -> AuthResult<KeySetDocument>;
}

#[async_trait]
impl KeySetSource for KeySetPublisher {
    async fn key_set(&self) -> AuthResult<KeySetDocument> {
        let publisher = self.clone();
        tokio::task::spawn_blocking(move || publisher.publish())
            .await
            .map_err(|e| AuthError::KeySetUnavailable(format!("publisher task failed: {e}")))?
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))
    }
}

#[async_trait]
impl KeySetSource for JwksClient {
    async fn key_set(&self) -> AuthResult<KeySetDocument> {
        self.get_key_set().await
    }
}

/// A fixed, in-memory key set.
#[async_trait]
impl KeySetSource for KeySetDocument {
    async fn key_set(&self) -> AuthResult<KeySetDocument> {
        Ok(self.clone())
    }
}
