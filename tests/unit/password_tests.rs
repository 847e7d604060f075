// ============================
// tests/unit/password_tests.rs
// ============================
//! Unit tests for the password hasher
use backend_lib::auth::{PasswordHasher, MAX_PASSWORD_BYTES};
use backend_lib::error::AppError;

fn hasher() -> PasswordHasher {
    PasswordHasher::new(4).unwrap()
}

#[test]
fn test_password_hashing_and_verification() {
    let hasher = hasher();
    let digest = hasher.hash("correct horse").unwrap();

    assert_ne!(digest, "correct horse");
    assert!(!digest.contains("correct horse"));
    assert!(hasher.verify("correct horse", &digest));
    assert!(!hasher.verify("wrong horse", &digest));
}

#[test]
fn test_hashing_is_salted() {
    let hasher = hasher();
    let first = hasher.hash("same-password").unwrap();
    let second = hasher.hash("same-password").unwrap();

    assert_ne!(first, second);
    assert!(hasher.verify("same-password", &first));
    assert!(hasher.verify("same-password", &second));
}

#[test]
fn test_digest_is_self_describing() {
    let digest = hasher().hash("secret123").unwrap();
    assert!(digest.starts_with("$scrypt$ln=4,"));
}

#[test]
fn test_verify_never_errors_on_garbage() {
    let hasher = hasher();
    for digest in ["", "plaintext", "$argon2id$v=19$bogus", "$scrypt$ln=4,r=8,p=1$$"] {
        assert!(!hasher.verify("secret123", digest));
    }
}

#[test]
fn test_password_length_cap() {
    let hasher = hasher();
    let at_limit = "x".repeat(MAX_PASSWORD_BYTES);
    assert!(hasher.hash(&at_limit).is_ok());

    let over = "x".repeat(MAX_PASSWORD_BYTES + 1);
    assert!(matches!(hasher.hash(&over), Err(AppError::InputTooLong { .. })));
}
