// ============================
// crates/backend-lib/src/auth/rate_limit.rs
// ============================
//! Throttling of failed logins, keyed by account category and email.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::role::Role;
use crate::config::RateLimitSettings;

/// Entry in the rate limit map
#[derive(Debug, Clone)]
struct RateLimitEntry {
    /// Number of failed attempts
    failed_attempts: u32,
    /// Time of the last failed attempt
    last_failure: Instant,
    /// When the lockout expires, if locked
    lockout_expiry: Option<Instant>,
}

/// Rate limiter for login attempts
#[derive(Debug, Clone)]
pub struct LoginRateLimiter {
    /// Map of `role:email` identities to rate limit entries
    attempts: Arc<DashMap<String, RateLimitEntry>>,
    /// Maximum number of failed attempts before lockout
    max_attempts: u32,
    /// Duration of lockout period
    lockout_duration: Duration,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::from_settings(&RateLimitSettings::default())
    }
}

/// Limiter key for an account identity
pub fn identity_key(role: Role, email: &str) -> String {
    format!("{role}:{email}")
}

impl LoginRateLimiter {
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_attempts,
            lockout_duration,
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_secs(settings.lockout_secs),
        )
    }

    /// Record a failed login
    pub fn record_failed_attempt(&self, key: &str) {
        let now = Instant::now();

        let mut entry = self
            .attempts
            .entry(key.to_string())
            .or_insert_with(|| RateLimitEntry {
                failed_attempts: 0,
                last_failure: now,
                lockout_expiry: None,
            });

        // A served lockout starts a fresh count
        if entry.lockout_expiry.is_some_and(|expiry| now >= expiry) {
            entry.failed_attempts = 0;
            entry.lockout_expiry = None;
        }

        entry.failed_attempts += 1;
        entry.last_failure = now;

        if entry.failed_attempts >= self.max_attempts && entry.lockout_expiry.is_none() {
            entry.lockout_expiry = Some(now + self.lockout_duration);
            tracing::warn!(identity = %key, "login locked out after repeated failures");
        }
    }

    /// Forget failures after a successful login or password reset
    pub fn record_success(&self, key: &str) {
        self.attempts.remove(key);
    }

    /// Whether the identity may attempt to log in right now
    pub fn check_rate_limit(&self, key: &str) -> bool {
        match self.attempts.get(key) {
            Some(entry) => !entry
                .lockout_expiry
                .is_some_and(|expiry| Instant::now() < expiry),
            None => true,
        }
    }

    /// Drop expired lockouts and day-old failure counts. Returns how many
    /// identities were dropped.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let before = self.attempts.len();

        self.attempts.retain(|_, entry| {
            if let Some(expiry) = entry.lockout_expiry {
                return now < expiry;
            }
            now.duration_since(entry.last_failure) < Duration::from_secs(24 * 60 * 60)
        });

        before.saturating_sub(self.attempts.len())
    }
}
