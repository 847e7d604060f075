// ============================
// backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use scrypt::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Params, Scrypt,
};

use crate::error::AppError;

/// Longest password accepted, in bytes. Anything longer is refused before
/// hashing so a single request cannot buy unbounded CPU time.
pub const MAX_PASSWORD_BYTES: usize = 128;

/// Salted scrypt hasher producing PHC strings (`$scrypt$ln=..,r=..,p=..$salt$hash`).
///
/// Cost parameters travel inside every digest, so digests made under a
/// different `log_n` still verify after the setting changes.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Hasher with the given CPU/memory cost (log2 of N), r=8, p=1
    pub fn new(log_n: u8) -> Result<Self, AppError> {
        let params = Params::new(
            log_n,
            Params::RECOMMENDED_R,
            Params::RECOMMENDED_P,
            Params::RECOMMENDED_LEN,
        )
        .map_err(|e| AppError::Config(format!("invalid scrypt parameters: {e}")))?;
        Ok(Self { params })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plain: &str) -> Result<String, AppError> {
        if plain.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::InputTooLong {
                max: MAX_PASSWORD_BYTES,
            });
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Scrypt
            .hash_password_customized(plain.as_bytes(), None, None, self.params, &salt)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored digest. A malformed digest or an
    /// oversized input never matches.
    pub fn verify(&self, plain: &str, digest: &str) -> bool {
        if plain.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        Scrypt.verify_password(plain.as_bytes(), &parsed).is_ok()
    }
}
