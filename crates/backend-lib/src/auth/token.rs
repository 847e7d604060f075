// ============================
// backend-lib/src/auth/token.rs
// ============================
//! Signed, self-contained session tokens (JWT, HMAC-signed).
//!
//! A token is trusted only after its signature and expiry check out. There is
//! no server-side session table and no revocation list: a token stays valid
//! until `exp`, even if the account is deleted in the meantime.
use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::role::Role;
use crate::config::AuthSettings;
use crate::error::AppError;

/// Claim names owned by the issuer; extra claims may not shadow them
const RESERVED_CLAIMS: [&str; 5] = ["sub", "role", "iat", "exp", "jti"];

/// Verified token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Normalized account email
    pub sub: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token id, so two tokens issued in the same second still differ
    pub jti: String,
    /// Caller-supplied claims such as the display name
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Issues and verifies session tokens with one shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer. Only the HMAC family is accepted as `algorithm`.
    pub fn new(secret: &str, algorithm: &str, ttl_minutes: u64) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::Config("token secret must not be empty".to_string()));
        }

        let algorithm = Algorithm::from_str(algorithm)
            .ok()
            .filter(|alg| matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512))
            .ok_or_else(|| {
                AppError::Config(format!("unsupported token algorithm '{algorithm}'"))
            })?;

        let default_ttl = i64::try_from(ttl_minutes)
            .ok()
            .and_then(Duration::try_minutes)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| AppError::Config(format!("invalid token lifetime {ttl_minutes}")))?;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            default_ttl,
        })
    }

    pub fn from_settings(settings: &AuthSettings) -> Result<Self, AppError> {
        Self::new(
            &settings.secret_key,
            &settings.algorithm,
            settings.access_token_expire_minutes,
        )
    }

    /// Sign a token for `subject`. `ttl` overrides the configured lifetime.
    pub fn issue(
        &self,
        subject: &str,
        role: Role,
        mut extra: Map<String, Value>,
        ttl: Option<Duration>,
    ) -> Result<String, AppError> {
        if subject.is_empty() {
            return Err(AppError::Internal(
                "cannot issue a token without a subject".to_string(),
            ));
        }

        extra.retain(|key, _| !RESERVED_CLAIMS.contains(&key.as_str()));

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl.unwrap_or(self.default_ttl))
            .ok_or_else(|| AppError::Internal("token expiry overflows".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            extra,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
    }

    /// Check signature, algorithm and expiry, and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|err| {
                let reason = match err.kind() {
                    ErrorKind::ExpiredSignature => "expired",
                    ErrorKind::InvalidSignature => "bad signature",
                    ErrorKind::InvalidAlgorithm => "unexpected algorithm",
                    ErrorKind::MissingRequiredClaim(_) => "missing claim",
                    _ => "malformed",
                };
                tracing::debug!(reason, "token rejected");
                AppError::InvalidToken(reason.to_string())
            })?
            .claims;

        if claims.sub.is_empty() {
            return Err(AppError::InvalidToken("empty subject".to_string()));
        }

        Ok(claims)
    }
}
