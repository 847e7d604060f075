// ============================
// crates/backend-lib/src/auth/service_impl.rs
// ============================
use std::sync::Arc;

use ::metrics::counter;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use marketplace_common::{
    DocId, ForgotPasswordResponse, ProfileResponse, ProfileUpdate, RegisterRequest,
    ResetPasswordRequest,
};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::rate_limit::{identity_key, LoginRateLimiter};
use super::token_generator::generate_reset_token;
use super::{AuthService, Claims, PasswordHasher, Role, TokenIssuer};
use crate::accounts::{Account, AccountStore, Profile};
use crate::config::AuthSettings;
use crate::error::AppError;
use crate::metrics;
use crate::storage::{to_record, DocumentStore};
use crate::validation::{
    normalize_email, validate_name, validate_password, validate_registration,
};

/// Acknowledgement returned by forgot-password, whatever the outcome
pub const RESET_ACKNOWLEDGEMENT: &str =
    "If an active account exists for this email, recovery instructions will be sent.";

pub struct DefaultAuth<S> {
    accounts: AccountStore<S>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    limiter: Arc<LoginRateLimiter>,
    echo_reset_token: bool,
    reset_ttl: Option<Duration>,
    password_min_length: usize,
    /// Digest checked against when the account does not exist, so unknown
    /// emails cost the same as wrong passwords
    dummy_digest: String,
}

impl<S: DocumentStore> DefaultAuth<S> {
    pub fn new(
        store: S,
        settings: &AuthSettings,
        limiter: Arc<LoginRateLimiter>,
    ) -> Result<Self, AppError> {
        let hasher = PasswordHasher::new(settings.scrypt_log_n)?;
        let tokens = TokenIssuer::from_settings(settings)?;
        let reset_ttl = match settings.reset_token_ttl_minutes {
            Some(minutes) => Some(
                i64::try_from(minutes)
                    .ok()
                    .and_then(Duration::try_minutes)
                    .ok_or_else(|| {
                        AppError::Config(format!("invalid reset token lifetime {minutes}"))
                    })?,
            ),
            None => None,
        };
        let dummy_digest = hasher.hash("placeholder-password")?;

        Ok(Self {
            accounts: AccountStore::new(store),
            hasher,
            tokens,
            limiter,
            echo_reset_token: settings.debug_password_reset_token,
            reset_ttl,
            password_min_length: settings.password_min_length,
            dummy_digest,
        })
    }

    /// scrypt is CPU bound; keep it off the async workers
    async fn hash_password(&self, plain: String) -> Result<String, AppError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(&self, plain: String, digest: String) -> Result<bool, AppError> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.verify(&plain, &digest))
            .await
            .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))
    }

    fn reset_expired(&self, account: &Account) -> bool {
        let Some(ttl) = self.reset_ttl else {
            return false;
        };
        match account.reset_requested_at {
            Some(requested_at) => {
                requested_at.saturating_add(ttl.num_seconds()) < Utc::now().timestamp()
            },
            None => true,
        }
    }

    async fn existing_account(&self, role: Role, email: &str) -> Result<Account, AppError> {
        self.accounts
            .find_by_email(role, &normalize_email(email))
            .await?
            .ok_or_else(|| AppError::NotFound("Account".to_string()))
    }
}

#[async_trait]
impl<S: DocumentStore> AuthService for DefaultAuth<S> {
    async fn register(&self, role: Role, request: RegisterRequest) -> Result<DocId, AppError> {
        if request.password != request.password_confirmation {
            return Err(AppError::PasswordMismatch);
        }
        validate_registration(&request, self.password_min_length)?;

        let email = normalize_email(&request.email);
        if self.accounts.find_by_email(role, &email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let digest = self.hash_password(request.password).await?;
        let profile = Profile {
            name: request.name.trim().to_string(),
            phone: request.phone,
            tax_id: request.tax_id,
            address: request.address,
        };
        let id = self
            .accounts
            .insert(role, &Account::new(email.clone(), digest, profile))
            .await?;

        counter!(metrics::ACCOUNT_REGISTERED, "role" => role.as_str()).increment(1);
        info!(%role, %email, id, "account registered");
        Ok(id)
    }

    async fn login(&self, role: Role, email: &str, password: &str) -> Result<String, AppError> {
        let email = normalize_email(email);
        let key = identity_key(role, &email);

        if !self.limiter.check_rate_limit(&key) {
            counter!(metrics::LOGIN_THROTTLED, "role" => role.as_str()).increment(1);
            return Err(AppError::AuthRateLimited);
        }

        let account = self.accounts.find_by_email(role, &email).await?;
        let digest = account
            .as_ref()
            .map_or_else(|| self.dummy_digest.clone(), |a| a.password_digest.clone());
        let password_ok = self.verify_password(password.to_string(), digest).await?;

        let account = match account {
            Some(account) if password_ok && account.active => account,
            _ => {
                self.limiter.record_failed_attempt(&key);
                counter!(metrics::LOGIN_FAILED, "role" => role.as_str()).increment(1);
                debug!(%role, %email, "login rejected");
                return Err(AppError::InvalidCredentials);
            },
        };

        self.limiter.record_success(&key);

        let mut extra = Map::new();
        extra.insert("name".to_string(), Value::String(account.profile.name.clone()));
        let token = self.tokens.issue(&account.email, role, extra, None)?;

        counter!(metrics::LOGIN_SUCCEEDED, "role" => role.as_str()).increment(1);
        info!(%role, %email, "login succeeded");
        Ok(token)
    }

    async fn request_reset(
        &self,
        role: Role,
        email: &str,
    ) -> Result<ForgotPasswordResponse, AppError> {
        let email = normalize_email(email);
        let acknowledgement = |token_debug: Option<String>| ForgotPasswordResponse {
            message: RESET_ACKNOWLEDGEMENT.to_string(),
            token_debug,
        };

        match self.accounts.find_by_email(role, &email).await? {
            Some(account) if account.active => {},
            _ => {
                debug!(%role, %email, "reset requested for unknown or inactive account");
                return Ok(acknowledgement(None));
            },
        }

        let token = generate_reset_token();
        if !self.accounts.set_reset_token(role, &email, &token).await? {
            // removed between lookup and write
            return Ok(acknowledgement(None));
        }

        counter!(metrics::RESET_REQUESTED, "role" => role.as_str()).increment(1);
        info!(%role, %email, "password reset token issued");

        Ok(acknowledgement(self.echo_reset_token.then_some(token)))
    }

    async fn redeem_reset(&self, role: Role, request: ResetPasswordRequest) -> Result<(), AppError> {
        if request.password != request.password_confirmation {
            return Err(AppError::PasswordMismatch);
        }
        validate_password(&request.password, self.password_min_length)?;

        let token = request.token.trim();
        if token.is_empty() {
            return Err(AppError::InvalidOrExpiredToken);
        }

        let account = self
            .accounts
            .find_by_reset_token(role, token)
            .await?
            .ok_or(AppError::InvalidOrExpiredToken)?;

        if self.reset_expired(&account) {
            self.accounts.clear_reset_token(role, token).await?;
            warn!(%role, email = %account.email, "expired reset token presented");
            return Err(AppError::InvalidOrExpiredToken);
        }

        let digest = self.hash_password(request.password).await?;
        // conditional on the token so a concurrent redemption cannot win twice
        if !self.accounts.redeem_reset_token(role, token, &digest).await? {
            return Err(AppError::InvalidOrExpiredToken);
        }

        self.limiter.record_success(&identity_key(role, &account.email));
        counter!(metrics::RESET_REDEEMED, "role" => role.as_str()).increment(1);
        info!(%role, email = %account.email, "password reset completed");
        Ok(())
    }

    fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        self.tokens.verify(token)
    }

    async fn profile(&self, role: Role, email: &str) -> Result<ProfileResponse, AppError> {
        Ok(self.existing_account(role, email).await?.to_response())
    }

    async fn account_id(&self, role: Role, email: &str) -> Result<DocId, AppError> {
        self.accounts
            .id_of(role, &normalize_email(email))
            .await?
            .ok_or_else(|| AppError::NotFound("Account".to_string()))
    }

    async fn update_profile(
        &self,
        role: Role,
        email: &str,
        mut update: ProfileUpdate,
    ) -> Result<ProfileResponse, AppError> {
        if let Some(name) = update.name.as_deref() {
            update.name = Some(validate_name(name)?.to_string());
        }

        let email = normalize_email(email);
        let patch = to_record(&update)?;
        if !patch.is_empty() && !self.accounts.update(role, &email, patch).await? {
            return Err(AppError::NotFound("Account".to_string()));
        }

        debug!(%role, %email, "profile updated");
        self.profile(role, &email).await
    }

    async fn delete_account(&self, role: Role, email: &str) -> Result<(), AppError> {
        let email = normalize_email(email);
        if !self.accounts.delete(role, &email).await? {
            return Err(AppError::NotFound("Account".to_string()));
        }

        counter!(metrics::ACCOUNT_DELETED, "role" => role.as_str()).increment(1);
        info!(%role, %email, "account deleted");
        Ok(())
    }
}
