// ============================
// crates/backend-lib/src/auth/service.rs
// ============================
use async_trait::async_trait;
use marketplace_common::{
    DocId, ForgotPasswordResponse, ProfileResponse, ProfileUpdate, RegisterRequest,
    ResetPasswordRequest,
};

use super::{Claims, Role, RoleGate};
use crate::error::AppError;

/// Credential and session operations for all three account categories
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account; the email is normalized before it is stored
    async fn register(&self, role: Role, request: RegisterRequest) -> Result<DocId, AppError>;

    /// Check credentials and issue a session token. Every failure is the
    /// same `InvalidCredentials`.
    async fn login(&self, role: Role, email: &str, password: &str) -> Result<String, AppError>;

    /// Start password recovery. The reply looks the same whether or not the
    /// account exists.
    async fn request_reset(
        &self,
        role: Role,
        email: &str,
    ) -> Result<ForgotPasswordResponse, AppError>;

    /// Redeem a reset token, setting a new password
    async fn redeem_reset(&self, role: Role, request: ResetPasswordRequest) -> Result<(), AppError>;

    fn verify_token(&self, token: &str) -> Result<Claims, AppError>;

    /// Verify a token and pass it through the role gate; yields the subject
    fn authorize(&self, token: &str, gate: RoleGate) -> Result<String, AppError> {
        let claims = self.verify_token(token)?;
        gate.authorize(&claims)
    }

    async fn profile(&self, role: Role, email: &str) -> Result<ProfileResponse, AppError>;

    /// Document id of an existing account
    async fn account_id(&self, role: Role, email: &str) -> Result<DocId, AppError>;

    async fn update_profile(
        &self,
        role: Role,
        email: &str,
        update: ProfileUpdate,
    ) -> Result<ProfileResponse, AppError>;

    async fn delete_account(&self, role: Role, email: &str) -> Result<(), AppError>;
}
