// ==========================
// tests/unit/token_tests.rs
// ==========================
//! Unit tests for session tokens and the role gate
use backend_lib::auth::{require, Role, TokenIssuer};
use backend_lib::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Map};

use crate::test_utils::TEST_SECRET;

fn issuer() -> TokenIssuer {
    TokenIssuer::new(TEST_SECRET, "HS256", 30).unwrap()
}

#[test]
fn test_token_round_trip() {
    let issuer = issuer();
    let token = issuer.issue("a@x.com", Role::Customer, Map::new(), None).unwrap();

    let claims = issuer.verify(&token).unwrap();
    assert_eq!(claims.sub, "a@x.com");
    assert_eq!(claims.role, Role::Customer);

    // default lifetime is the configured 30 minutes
    assert_eq!(claims.exp - claims.iat, 30 * 60);
}

#[test]
fn test_token_is_url_safe() {
    let token = issuer().issue("a@x.com", Role::Supplier, Map::new(), None).unwrap();
    assert!(token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')));
}

#[test]
fn test_expired_token_fails() {
    let issuer = issuer();
    let token = issuer
        .issue("a@x.com", Role::Customer, Map::new(), Some(Duration::seconds(-1)))
        .unwrap();
    assert!(matches!(issuer.verify(&token), Err(AppError::InvalidToken(_))));
}

#[test]
fn test_unknown_role_fails_verification() {
    let now = Utc::now().timestamp();
    let token = encode(
        &Header::default(),
        &json!({ "sub": "a@x.com", "role": "admin", "iat": now, "exp": now + 600, "jti": "x" }),
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();
    assert!(matches!(issuer().verify(&token), Err(AppError::InvalidToken(_))));
}

#[test]
fn test_missing_or_empty_subject_fails() {
    let now = Utc::now().timestamp();
    let key = EncodingKey::from_secret(TEST_SECRET.as_bytes());

    let no_sub = encode(
        &Header::default(),
        &json!({ "role": "customer", "iat": now, "exp": now + 600, "jti": "x" }),
        &key,
    )
    .unwrap();
    assert!(issuer().verify(&no_sub).is_err());

    let empty_sub = encode(
        &Header::default(),
        &json!({ "sub": "", "role": "customer", "iat": now, "exp": now + 600, "jti": "x" }),
        &key,
    )
    .unwrap();
    assert!(matches!(issuer().verify(&empty_sub), Err(AppError::InvalidToken(_))));
}

#[test]
fn test_role_gate() {
    let issuer = issuer();
    let customer = issuer
        .verify(&issuer.issue("a@x.com", Role::Customer, Map::new(), None).unwrap())
        .unwrap();

    assert!(matches!(
        require(Role::Restaurant).authorize(&customer),
        Err(AppError::Forbidden)
    ));
    assert_eq!(require(Role::Customer).authorize(&customer).unwrap(), "a@x.com");
}

#[test]
fn test_verification_and_role_failures_are_distinct() {
    assert_ne!(
        AppError::InvalidToken("expired".into()).status_code(),
        AppError::Forbidden.status_code()
    );
}
