// ============================
// crates/backend-lib/src/accounts.rs
// ============================
//! Typed access to the account collections.
//!
//! One collection per [`Role`]; within a collection the normalized email is
//! unique. Emails are normalized by the caller before they reach this layer.
use chrono::Utc;
use marketplace_common::{DocId, ProfileResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::Role;
use crate::error::AppError;
use crate::storage::{to_record, DocumentStore, Filter, Record};

/// Descriptive account fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Stored account record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    pub password_digest: String,
    /// Pending reset token, at most one per account
    #[serde(default)]
    pub reset_token: Option<String>,
    /// Unix timestamp at which `reset_token` was issued
    #[serde(default)]
    pub reset_requested_at: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(flatten)]
    pub profile: Profile,
}

fn default_active() -> bool {
    true
}

impl Account {
    pub fn new(email: String, password_digest: String, profile: Profile) -> Self {
        Self {
            email,
            password_digest,
            reset_token: None,
            reset_requested_at: None,
            active: true,
            profile,
        }
    }

    /// Public view without credentials
    pub fn to_response(&self) -> ProfileResponse {
        ProfileResponse {
            email: self.email.clone(),
            name: self.profile.name.clone(),
            phone: self.profile.phone.clone(),
            tax_id: self.profile.tax_id.clone(),
            address: self.profile.address.clone(),
            active: self.active,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccountStore<S> {
    store: S,
}

impl<S: DocumentStore> AccountStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn find_by_email(&self, role: Role, email: &str) -> Result<Option<Account>, AppError> {
        self.find(role, Filter::eq("email", email)).await
    }

    pub async fn find_by_reset_token(
        &self,
        role: Role,
        token: &str,
    ) -> Result<Option<Account>, AppError> {
        self.find(role, Filter::eq("reset_token", token)).await
    }

    pub async fn id_of(&self, role: Role, email: &str) -> Result<Option<DocId>, AppError> {
        Ok(self
            .store
            .find_one(role.collection(), &Filter::eq("email", email))
            .await?
            .map(|doc| doc.id))
    }

    async fn find(&self, role: Role, filter: Filter) -> Result<Option<Account>, AppError> {
        self.store
            .find_one(role.collection(), &filter)
            .await?
            .map(|doc| doc.into_typed())
            .transpose()
    }

    /// Insert a new account; `DuplicateEmail` if the email is taken in this
    /// category
    pub async fn insert(&self, role: Role, account: &Account) -> Result<DocId, AppError> {
        self.store
            .insert_unique(role.collection(), "email", to_record(account)?)
            .await?
            .ok_or(AppError::DuplicateEmail)
    }

    /// Merge `patch` into the account. Returns false when no such account.
    pub async fn update(&self, role: Role, email: &str, patch: Record) -> Result<bool, AppError> {
        let updated = self
            .store
            .update(role.collection(), &Filter::eq("email", email), patch)
            .await?;
        Ok(updated > 0)
    }

    /// Store a new pending reset token, replacing any earlier one
    pub async fn set_reset_token(&self, role: Role, email: &str, token: &str) -> Result<bool, AppError> {
        let patch = json!({
            "reset_token": token,
            "reset_requested_at": Utc::now().timestamp(),
        });
        self.update(role, email, value_to_record(patch)).await
    }

    /// Replace the digest of whichever account still holds `token` and clear
    /// the token in the same write. Returns false if the token was already
    /// consumed or superseded.
    pub async fn redeem_reset_token(
        &self,
        role: Role,
        token: &str,
        password_digest: &str,
    ) -> Result<bool, AppError> {
        let patch = json!({
            "password_digest": password_digest,
            "reset_token": Value::Null,
            "reset_requested_at": Value::Null,
        });
        let updated = self
            .store
            .update(
                role.collection(),
                &Filter::eq("reset_token", token),
                value_to_record(patch),
            )
            .await?;
        Ok(updated > 0)
    }

    /// Drop a pending token that can no longer be redeemed
    pub async fn clear_reset_token(&self, role: Role, token: &str) -> Result<(), AppError> {
        let patch = json!({ "reset_token": Value::Null, "reset_requested_at": Value::Null });
        self.store
            .update(
                role.collection(),
                &Filter::eq("reset_token", token),
                value_to_record(patch),
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, role: Role, email: &str) -> Result<bool, AppError> {
        let removed = self
            .store
            .remove(role.collection(), &Filter::eq("email", email))
            .await?;
        Ok(removed > 0)
    }
}

fn value_to_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}
