// ============================
// backend-lib/src/config.rs
// ============================
//! Configuration management.
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! environment variables prefixed `MARKETPLACE_` (nested keys separated by
//! `__`, e.g. `MARKETPLACE_AUTH__SECRET_KEY`).
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "MARKETPLACE_";

/// Placeholder secret shipped in the defaults; never fit for production
pub const DEFAULT_SECRET_KEY: &str = "CHANGE_ME_IN_PRODUCTION_MIN_32_CHARS";

/// Signing algorithms accepted for session tokens (symmetric only)
pub const SUPPORTED_ALGORITHMS: [&str; 3] = ["HS256", "HS384", "HS512"];

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub rate_limit: RateLimitSettings,
    pub payment: PaymentSettings,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Path of the JSON document file
    pub path: PathBuf,
}

/// Credential and session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC secret used to sign session tokens
    pub secret_key: String,
    /// Token signing algorithm identifier, one of [`SUPPORTED_ALGORITHMS`]
    pub algorithm: String,
    pub access_token_expire_minutes: u64,
    /// Echo freshly generated reset tokens back to the caller.
    /// Development only.
    pub debug_password_reset_token: bool,
    /// Lifetime of a pending reset token; `None` keeps it valid until
    /// redeemed or superseded.
    pub reset_token_ttl_minutes: Option<u64>,
    /// scrypt cost parameter (log2 of N)
    pub scrypt_log_n: u8,
    pub password_min_length: usize,
}

/// Login throttling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Failed logins tolerated before the identity is locked
    pub max_attempts: u32,
    pub lockout_secs: u64,
}

/// Hosted checkout settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSettings {
    /// Secret API key (`sk_...`)
    pub stripe_api_key: String,
    pub api_base: String,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            storage: StorageSettings::default(),
            auth: AuthSettings::default(),
            rate_limit: RateLimitSettings::default(),
            payment: PaymentSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("database.json"),
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
            debug_password_reset_token: false,
            reset_token_ttl_minutes: None,
            scrypt_log_n: 15,
            password_min_length: 6,
        }
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_secs: 5 * 60,
        }
    }
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            stripe_api_key: "sk_test_placeholder".to_string(),
            api_base: "https://api.stripe.com".to_string(),
            currency: "brl".to_string(),
            success_url: "http://127.0.0.1:8000/payment/success?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "http://127.0.0.1:8000/payment/cancel".to_string(),
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid bind address: {e}")))
    }
}

impl Settings {
    /// Load settings from `config.toml` in the working directory and the
    /// environment
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings from an explicit TOML file and the environment. A
    /// missing file is not an error; defaults apply.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Self::figment(path.as_ref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(AppError::Config(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }

        if self.auth.secret_key.is_empty() {
            return Err(AppError::Config("auth.secret_key must be set".to_string()));
        }

        if !SUPPORTED_ALGORITHMS.contains(&self.auth.algorithm.as_str()) {
            return Err(AppError::Config(format!(
                "auth.algorithm must be one of {SUPPORTED_ALGORITHMS:?}"
            )));
        }

        if self.auth.access_token_expire_minutes == 0 {
            return Err(AppError::Config(
                "auth.access_token_expire_minutes must be positive".to_string(),
            ));
        }

        if self.auth.reset_token_ttl_minutes == Some(0) {
            return Err(AppError::Config(
                "auth.reset_token_ttl_minutes must be positive when set".to_string(),
            ));
        }

        if !(1..=20).contains(&self.auth.scrypt_log_n) {
            return Err(AppError::Config(
                "auth.scrypt_log_n must be between 1 and 20".to_string(),
            ));
        }

        if self.auth.password_min_length == 0 {
            return Err(AppError::Config(
                "auth.password_min_length must be positive".to_string(),
            ));
        }

        if self.rate_limit.max_attempts == 0 {
            return Err(AppError::Config(
                "rate_limit.max_attempts must be positive".to_string(),
            ));
        }

        self.server.bind_addr()?;

        Ok(())
    }

    /// Warn about settings that run but are unsafe in production
    pub fn log_warnings(&self) {
        if self.auth.secret_key.len() < 32 || self.auth.secret_key == DEFAULT_SECRET_KEY {
            tracing::warn!("auth.secret_key is weak or the shipped default; set a strong secret");
        }
        if self.auth.debug_password_reset_token {
            tracing::warn!("reset tokens are echoed to callers; never enable this in production");
        }
        if self.payment.stripe_api_key.contains("placeholder") {
            tracing::warn!("payment.stripe_api_key is unset; checkout will fail");
        }
    }
}
