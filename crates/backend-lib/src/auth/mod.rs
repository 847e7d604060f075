// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod extract;
pub mod password;
pub mod rate_limit;
pub mod role;
pub mod token;
pub mod token_generator;
mod service;
mod service_impl;

pub use extract::BearerToken;
pub use password::{PasswordHasher, MAX_PASSWORD_BYTES};
pub use rate_limit::LoginRateLimiter;
pub use role::{require, Role, RoleGate};
pub use service::AuthService;
pub use service_impl::{DefaultAuth, RESET_ACKNOWLEDGEMENT};
pub use token::{Claims, TokenIssuer};
