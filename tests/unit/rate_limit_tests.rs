// ==============================
// tests/unit/rate_limit_tests.rs
// ==============================
//! This test suite is designed to validate the functionality of the `LoginRateLimiter`
use backend_lib::auth::rate_limit::identity_key;
use backend_lib::auth::{LoginRateLimiter, Role};

#[test]
fn test_rate_limiter_allows_initial_attempts() {
    let rate_limiter = LoginRateLimiter::default();
    assert!(rate_limiter.check_rate_limit(&identity_key(Role::Customer, "a@x.com")));
}

#[test]
fn test_rate_limiter_blocks_after_max_attempts() {
    let rate_limiter = LoginRateLimiter::default();
    let key = identity_key(Role::Customer, "b@x.com");

    // default max is 5
    for _ in 0..5 {
        rate_limiter.record_failed_attempt(&key);
    }

    assert!(!rate_limiter.check_rate_limit(&key));
}

#[test]
fn test_rate_limiter_resets_after_success() {
    let rate_limiter = LoginRateLimiter::default();
    let key = identity_key(Role::Restaurant, "c@x.com");

    for _ in 0..4 {
        rate_limiter.record_failed_attempt(&key);
    }
    rate_limiter.record_success(&key);

    for _ in 0..4 {
        rate_limiter.record_failed_attempt(&key);
    }
    assert!(rate_limiter.check_rate_limit(&key));
}

#[test]
fn test_identities_are_per_category() {
    assert_ne!(
        identity_key(Role::Customer, "a@x.com"),
        identity_key(Role::Supplier, "a@x.com")
    );
}
