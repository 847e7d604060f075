// ============================
// crates/backend-lib/src/auth/token_generator.rs
// ============================
//! Random reset tokens.
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// Entropy of a password-reset token in bytes (256 bits)
pub const RESET_TOKEN_BYTES: usize = 32;

/// Generate an opaque, URL-safe reset token from OS entropy
pub fn generate_reset_token() -> String {
    generate_secure_token_with_size(RESET_TOKEN_BYTES)
}

/** Generate a cryptographically secure random token with specified size
# Arguments
* `bytes` - The size of the random token in bytes
# Returns
A base64 URL-safe encoded string without padding */
pub fn generate_secure_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}
