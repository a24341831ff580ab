//! Common test utilities for integration tests
//!
//! Shared signing keys and claim builders for verification scenarios.

#![allow(dead_code)]

use std::sync::OnceLock;

use serde_json::{Value, json};
use stackrox_mcp_keys::{KeyPair, KeySetDocument, to_keyset};

pub const ISSUER: &str = "https://stackrox.io/jwt";
pub const AUDIENCE: &str = "https://stackrox.io/jwt-sources#api-tokens";

/// Fixed verification time used by tests that pass `now` explicitly.
pub const NOW: u64 = 1_750_000_000;

/// Signing key published as `jwtk0`.
pub fn current_key() -> &'static KeyPair {
    static KEY: OnceLock<KeyPair> = OnceLock::new();
    KEY.get_or_init(|| KeyPair::generate("jwtk0").expect("key generation"))
}

/// Signing key published as `jwtk1`.
pub fn next_key() -> &'static KeyPair {
    static KEY: OnceLock<KeyPair> = OnceLock::new();
    KEY.get_or_init(|| KeyPair::generate("jwtk1").expect("key generation"))
}

/// Key set containing the given keys.
pub fn keyset(keys: &[&KeyPair]) -> KeySetDocument {
    to_keyset(keys.iter().map(|k| k.public_jwk())).expect("valid key set")
}

/// Claims accepted by the default verifier at [`NOW`].
pub fn valid_claims(subject: &str) -> Value {
    json!({
        "iss": ISSUER,
        "sub": subject,
        "aud": AUDIENCE,
        "iat": NOW - 60,
        "exp": NOW + 3600,
    })
}

/// Claims accepted by the default verifier at the real current time.
pub fn live_claims(subject: &str) -> Value {
    let now = stackrox_mcp_auth::now_unix();
    json!({
        "iss": ISSUER,
        "sub": subject,
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 3600,
    })
}
