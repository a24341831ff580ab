//! Remote key-set fetching and caching
//!
//! [`JwksClient`] downloads the key-set document served by the publisher and
//! keeps it for a short TTL so that each inbound request does not cost a
//! round trip. A TTL of zero disables caching.
//!
//! # Security Considerations
//!
//! - HTTPS is required, except for `localhost` and `127.0.0.1`
//! - The cached document is replaced wholesale, so a retired key disappears
//!   from verification at most one TTL after it leaves the published set

use std::sync::Arc;
use std::time::{Duration, Instant};

use stackrox_mcp_keys::KeySetDocument;
use tokio::sync::RwLock;
use tracing::{debug, error, info};
use url::Url;

use crate::error::{AuthError, AuthResult};

/// Default cache TTL for fetched key sets.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct CachedKeySet {
    document: KeySetDocument,
    fetched_at: Instant,
}

/// Client for a remote key-set endpoint.
///
/// # Example
///
/// ```rust,no_run
/// # use stackrox_mcp_auth::JwksClient;
/// # tokio_test::block_on(async {
/// let client = JwksClient::new("http://localhost:8000/jwks.json")?;
/// let keys = client.get_key_set().await?;
/// println!("{} published keys", keys.keys.len());
/// # Ok::<(), stackrox_mcp_auth::AuthError>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct JwksClient {
    jwks_uri: Url,
    cache: Arc<RwLock<Option<CachedKeySet>>>,
    http_client: reqwest::Client,
    cache_ttl: Duration,
}

impl JwksClient {
    /// Create a client with the default TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeySetUnavailable`] if the URI does not parse, is
    /// not HTTPS for a non-local host, or the HTTP client cannot be built.
    pub fn new(jwks_uri: impl AsRef<str>) -> AuthResult<Self> {
        Self::with_ttl(jwks_uri, DEFAULT_CACHE_TTL)
    }

    /// Create a client with a custom TTL.
    ///
    /// # Errors
    ///
    /// See [`JwksClient::new`].
    pub fn with_ttl(jwks_uri: impl AsRef<str>, cache_ttl: Duration) -> AuthResult<Self> {
        let jwks_uri = Url::parse(jwks_uri.as_ref()).map_err(|e| {
            AuthError::KeySetUnavailable(format!("invalid JWKS URI '{}': {e}", jwks_uri.as_ref()))
        })?;
        check_transport(&jwks_uri)?;

        let http_client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AuthError::KeySetUnavailable(format!("HTTP client: {e}")))?;

        Ok(Self {
            jwks_uri,
            cache: Arc::new(RwLock::new(None)),
            http_client,
            cache_ttl,
        })
    }

    /// The endpoint this client fetches from.
    pub fn jwks_uri(&self) -> &Url {
        &self.jwks_uri
    }

    /// The configured cache TTL.
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Key set from cache, or fetched if the cache is empty or stale.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeySetUnavailable`] if the endpoint is
    /// unreachable, answers with an error status, or serves a document that
    /// is not a valid key set.
    pub async fn get_key_set(&self) -> AuthResult<KeySetDocument> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref()
                && cached.fetched_at.elapsed() < self.cache_ttl
            {
                debug!(jwks_uri = %self.jwks_uri, "Using cached key set");
                return Ok(cached.document.clone());
            }
        }

        self.refresh().await
    }

    /// Fetch the key set, bypassing and replacing the cache.
    ///
    /// # Errors
    ///
    /// See [`JwksClient::get_key_set`].
    pub async fn refresh(&self) -> AuthResult<KeySetDocument> {
        info!(jwks_uri = %self.jwks_uri, "Fetching key set");

        let response = self
            .http_client
            .get(self.jwks_uri.clone())
            .send()
            .await
            .map_err(|e| {
                error!(jwks_uri = %self.jwks_uri, error = %e, "Failed to fetch key set");
                AuthError::KeySetUnavailable(format!("fetch failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(jwks_uri = %self.jwks_uri, %status, "Key-set endpoint returned error status");
            return Err(AuthError::KeySetUnavailable(format!(
                "endpoint returned status {status}"
            )));
        }

        let document: KeySetDocument = response.json().await.map_err(|e| {
            error!(jwks_uri = %self.jwks_uri, error = %e, "Failed to parse key set");
            AuthError::KeySetUnavailable(format!("invalid key-set document: {e}"))
        })?;
        document
            .validate()
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        info!(
            jwks_uri = %self.jwks_uri,
            key_count = document.keys.len(),
            "Fetched key set"
        );

        if !self.cache_ttl.is_zero() {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedKeySet {
                document: document.clone(),
                fetched_at: Instant::now(),
            });
        }

        Ok(document)
    }

    /// Drop the cached key set.
    pub async fn clear_cache(&self) {
        *self.cache.write().await = None;
        debug!(jwks_uri = %self.jwks_uri, "Key-set cache cleared");
    }
}

fn check_transport(uri: &Url) -> AuthResult<()> {
    match uri.scheme() {
        "https" => Ok(()),
        "http" if matches!(uri.host_str(), Some("localhost" | "127.0.0.1" | "[::1]")) => Ok(()),
        _ => Err(AuthError::KeySetUnavailable(format!(
            "JWKS endpoint must use HTTPS (HTTP only allowed for localhost): {uri}"
        ))),
    }
}
