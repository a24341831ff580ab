//! Token verification edge cases
//!
//! Signature, key-rotation and claim checks of the RS256 verifier.

mod common;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use stackrox_mcp_auth::{Audience, TokenVerifier, VerificationError, verify};

#[test]
fn test_sign_verify_round_trip() {
    let token = current_key().sign(&valid_claims("alice")).unwrap();

    let claims = verify(&token, &keyset(&[current_key()]), ISSUER, AUDIENCE, NOW).unwrap();

    assert_eq!(claims.sub.as_deref(), Some("alice"));
    assert_eq!(claims.iss.as_deref(), Some(ISSUER));
    assert_eq!(claims.aud, Some(Audience::Single(AUDIENCE.to_string())));
}

#[test]
fn test_tampered_signature_rejected() {
    // GIVEN: a valid token with one signature byte flipped
    let token = current_key().sign(&valid_claims("alice")).unwrap();
    let (signing_input, signature) = token.rsplit_once('.').unwrap();
    let mut raw = URL_SAFE_NO_PAD.decode(signature).unwrap();
    raw[0] ^= 0x01;
    let tampered = format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(raw));

    // WHEN: verifying it
    let result = verify(&tampered, &keyset(&[current_key()]), ISSUER, AUDIENCE, NOW);

    // THEN: the signature check fails
    assert_eq!(result.unwrap_err(), VerificationError::BadSignature);
}

#[test]
fn test_tampered_payload_rejected() {
    let token = current_key().sign(&valid_claims("alice")).unwrap();
    let forged_payload = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(&valid_claims("mallory")).unwrap(),
    );
    let parts: Vec<&str> = token.split('.').collect();
    let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

    let result = verify(&forged, &keyset(&[current_key()]), ISSUER, AUDIENCE, NOW);
    assert_eq!(result.unwrap_err(), VerificationError::BadSignature);
}

#[test]
fn test_expired_token_rejected() {
    let mut claims = valid_claims("alice");
    claims["exp"] = json!(NOW - 1);
    let token = current_key().sign(&claims).unwrap();

    let result = verify(&token, &keyset(&[current_key()]), ISSUER, AUDIENCE, NOW);

    assert_eq!(
        result.unwrap_err(),
        VerificationError::Expired {
            expired_at: NOW - 1,
            now: NOW
        }
    );
}

#[test]
fn test_fractional_numeric_dates_accepted() {
    let mut claims = valid_claims("alice");
    claims["exp"] = json!(1_750_003_600.5);
    claims["iat"] = json!(1_749_999_940.25);
    let token = current_key().sign(&claims).unwrap();

    let verified = verify(&token, &keyset(&[current_key()]), ISSUER, AUDIENCE, NOW).unwrap();
    assert_eq!(verified.exp, Some(1_750_003_600.5));

    let result = verify(&token, &keyset(&[current_key()]), ISSUER, AUDIENCE, 1_750_003_601);
    assert_eq!(
        result.unwrap_err(),
        VerificationError::Expired {
            expired_at: 1_750_003_600,
            now: 1_750_003_601
        }
    );
}

#[test]
fn test_unknown_key_rejected() {
    let token = next_key().sign(&valid_claims("alice")).unwrap();

    let result = verify(&token, &keyset(&[current_key()]), ISSUER, AUDIENCE, NOW);

    assert_eq!(
        result.unwrap_err(),
        VerificationError::UnknownKey("jwtk1".to_string())
    );
}

#[test]
fn test_key_rotation() {
    // GIVEN: both keys published during the rotation window
    let old_token = current_key().sign(&valid_claims("alice")).unwrap();
    let new_token = next_key().sign(&valid_claims("bob")).unwrap();
    let mut published = keyset(&[current_key(), next_key()]);

    assert!(verify(&old_token, &published, ISSUER, AUDIENCE, NOW).is_ok());
    assert!(verify(&new_token, &published, ISSUER, AUDIENCE, NOW).is_ok());

    // WHEN: the old key is retired
    published.remove("jwtk0");

    // THEN: only tokens from the new key verify
    assert_eq!(
        verify(&old_token, &published, ISSUER, AUDIENCE, NOW).unwrap_err(),
        VerificationError::UnknownKey("jwtk0".to_string())
    );
    assert!(verify(&new_token, &published, ISSUER, AUDIENCE, NOW).is_ok());
}

#[test]
fn test_wrong_key_under_same_kid_rejected() {
    // A different key published under the token's kid
    let impostor = next_key().clone().with_key_id("jwtk0");
    let token = impostor.sign(&valid_claims("alice")).unwrap();

    let result = verify(&token, &keyset(&[current_key()]), ISSUER, AUDIENCE, NOW);
    assert_eq!(result.unwrap_err(), VerificationError::BadSignature);
}

#[test]
fn test_empty_key_set_rejects_everything() {
    let token = current_key().sign(&valid_claims("alice")).unwrap();

    let result = verify(
        &token,
        &stackrox_mcp_keys::KeySetDocument::empty(),
        ISSUER,
        AUDIENCE,
        NOW,
    );
    assert!(matches!(result, Err(VerificationError::UnknownKey(_))));
}

#[test]
fn test_issuer_mismatch() {
    let mut claims = valid_claims("alice");
    claims["iss"] = json!("https://attacker.example");
    let token = current_key().sign(&claims).unwrap();

    let result = verify(&token, &keyset(&[current_key()]), ISSUER, AUDIENCE, NOW);

    assert_eq!(
        result.unwrap_err(),
        VerificationError::IssuerMismatch {
            expected: ISSUER.to_string(),
            actual: "https://attacker.example".to_string(),
        }
    );
}

#[test]
fn test_audience_mismatch() {
    let mut claims = valid_claims("alice");
    claims["aud"] = json!(["some-other-service"]);
    let token = current_key().sign(&claims).unwrap();

    let result = verify(&token, &keyset(&[current_key()]), ISSUER, AUDIENCE, NOW);

    assert_eq!(
        result.unwrap_err(),
        VerificationError::AudienceMismatch {
            expected: AUDIENCE.to_string()
        }
    );
}

#[test]
fn test_audience_array_accepted() {
    let mut claims = valid_claims("alice");
    claims["aud"] = json!(["some-other-service", AUDIENCE]);
    let token = current_key().sign(&claims).unwrap();

    assert!(verify(&token, &keyset(&[current_key()]), ISSUER, AUDIENCE, NOW).is_ok());
}

#[test]
fn test_non_rs256_algorithm_rejected() {
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header {
            kid: Some("jwtk0".to_string()),
            ..jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256)
        },
        &valid_claims("alice"),
        &jsonwebtoken::EncodingKey::from_secret(b"shared-secret"),
    )
    .unwrap();

    let result = verify(&token, &keyset(&[current_key()]), ISSUER, AUDIENCE, NOW);
    assert!(matches!(
        result,
        Err(VerificationError::UnsupportedAlgorithm(_))
    ));
}

#[test]
fn test_missing_kid_is_malformed() {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&valid_claims("alice")).unwrap());
    let token = format!("{header}.{payload}.c2ln");

    let result = verify(&token, &keyset(&[current_key()]), ISSUER, AUDIENCE, NOW);
    assert!(matches!(result, Err(VerificationError::MalformedToken(_))));
}

#[test]
fn test_verifier_with_clock_skew() {
    let mut claims = valid_claims("alice");
    claims["exp"] = json!(NOW - 10);
    let token = current_key().sign(&claims).unwrap();
    let published = keyset(&[current_key()]);

    let strict = TokenVerifier::new(ISSUER, AUDIENCE);
    let lenient = TokenVerifier::new(ISSUER, AUDIENCE).with_clock_skew(30);

    assert!(strict.verify_at(&token, &published, NOW).is_err());
    assert!(lenient.verify_at(&token, &published, NOW).is_ok());
}
