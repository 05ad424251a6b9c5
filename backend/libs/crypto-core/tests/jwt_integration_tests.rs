/// Integration tests for crypto-core JWT functionality
///
/// This test module covers:
/// - Issue/verify lifecycle across independently constructed issuer and verifier
/// - Claims extraction
/// - Error classification for rejected tokens
use chrono::Duration;
use crypto_core::jwt::{TokenError, TokenIssuer, TokenVerifier};

#[allow(dead_code)]
#[path = "../src/test_keys.rs"]
mod test_keys;

use test_keys::{OTHER_PUBLIC_KEY, TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_complete_token_lifecycle() {
    let issuer = TokenIssuer::from_rsa_pem(TEST_PRIVATE_KEY).expect("issuer");
    let verifier = TokenVerifier::from_rsa_pem(TEST_PUBLIC_KEY).expect("verifier");

    let token = issuer
        .issue("8b0c6f0e-3f7a-4c43-9d0e-3f1d1b2a7c55", "user", Duration::minutes(30))
        .expect("Should issue token");
    assert_eq!(token.matches('.').count(), 2, "JWT should have 3 parts");

    let claims = verifier.verify(&token).expect("Should verify");
    assert_eq!(
        claims.subject.as_deref(),
        Some("8b0c6f0e-3f7a-4c43-9d0e-3f1d1b2a7c55")
    );
    assert_eq!(claims.group.as_deref(), Some("user"));
    assert!(claims.raw.contains_key("iat"));
    assert!(claims.raw.contains_key("exp"));
}

#[test]
fn test_verifiers_are_independent_values() {
    let issuer = TokenIssuer::from_rsa_pem(TEST_PRIVATE_KEY).unwrap();
    let token = issuer.issue("acc-1", "user", Duration::minutes(5)).unwrap();

    let trusting = TokenVerifier::from_rsa_pem(TEST_PUBLIC_KEY).unwrap();
    let other = TokenVerifier::from_rsa_pem(OTHER_PUBLIC_KEY).unwrap();

    assert!(trusting.verify(&token).is_ok());
    assert!(matches!(
        other.verify(&token),
        Err(TokenError::InvalidSignature(_))
    ));
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_bearer_prefix_is_not_stripped_by_verifier() {
    let issuer = TokenIssuer::from_rsa_pem(TEST_PRIVATE_KEY).unwrap();
    let verifier = TokenVerifier::from_rsa_pem(TEST_PUBLIC_KEY).unwrap();
    let token = issuer.issue("acc-1", "user", Duration::minutes(5)).unwrap();

    let result = verifier.verify(&format!("Bearer {}", token));
    assert!(result.is_err(), "Prefix stripping belongs to the caller");
}

#[test]
fn test_truncated_token_rejected() {
    let issuer = TokenIssuer::from_rsa_pem(TEST_PRIVATE_KEY).unwrap();
    let verifier = TokenVerifier::from_rsa_pem(TEST_PUBLIC_KEY).unwrap();
    let token = issuer.issue("acc-1", "user", Duration::minutes(5)).unwrap();

    let truncated: String = token.rsplitn(2, '.').nth(1).unwrap().to_string();
    assert!(matches!(
        verifier.verify(&truncated),
        Err(TokenError::Malformed(_))
    ));
}
