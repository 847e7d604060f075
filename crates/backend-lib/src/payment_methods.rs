// ============================
// crates/backend-lib/src/payment_methods.rs
// ============================
//! Payment methods registered by suppliers. Each record belongs to the
//! supplier that created it; other suppliers cannot see that it exists.
use marketplace_common::{DocId, PaymentMethod, PaymentMethodInput};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::storage::{to_record, DocumentStore, Filter};
use crate::validation::validate_payment_method;

pub const PAYMENT_METHODS: &str = "payment_methods";

#[derive(Debug, Serialize, Deserialize)]
struct StoredMethod {
    owner_email: String,
    method: String,
    #[serde(default)]
    details: Option<String>,
}

impl StoredMethod {
    fn new(owner_email: &str, input: PaymentMethodInput) -> Self {
        Self {
            owner_email: owner_email.to_string(),
            method: input.method.trim().to_string(),
            details: input.details,
        }
    }

    fn with_id(self, id: DocId) -> PaymentMethod {
        PaymentMethod {
            id,
            owner_email: self.owner_email,
            method: self.method,
            details: self.details,
        }
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Payment method".to_string())
}

#[derive(Debug, Clone)]
pub struct PaymentMethods<S> {
    store: S,
}

impl<S: DocumentStore> PaymentMethods<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        owner_email: &str,
        input: PaymentMethodInput,
    ) -> Result<PaymentMethod, AppError> {
        validate_payment_method(&input)?;
        let stored = StoredMethod::new(owner_email, input);
        let id = self.store.insert(PAYMENT_METHODS, to_record(&stored)?).await?;
        info!(id, owner = %owner_email, method = %stored.method, "payment method added");
        Ok(stored.with_id(id))
    }

    pub async fn list(&self, owner_email: &str) -> Result<Vec<PaymentMethod>, AppError> {
        self.store
            .find_all(PAYMENT_METHODS, &Filter::eq("owner_email", owner_email))
            .await?
            .into_iter()
            .map(|doc| {
                let id = doc.id;
                doc.into_typed::<StoredMethod>().map(|m| m.with_id(id))
            })
            .collect()
    }

    pub async fn get(&self, owner_email: &str, id: DocId) -> Result<PaymentMethod, AppError> {
        let doc = self
            .store
            .get(PAYMENT_METHODS, id)
            .await?
            .ok_or_else(not_found)?;
        let stored: StoredMethod = doc.into_typed()?;
        if stored.owner_email != owner_email {
            return Err(not_found());
        }
        Ok(stored.with_id(id))
    }

    pub async fn update(
        &self,
        owner_email: &str,
        id: DocId,
        input: PaymentMethodInput,
    ) -> Result<PaymentMethod, AppError> {
        validate_payment_method(&input)?;
        self.get(owner_email, id).await?;

        let stored = StoredMethod::new(owner_email, input);
        if !self.store.replace(PAYMENT_METHODS, id, to_record(&stored)?).await? {
            return Err(not_found());
        }
        Ok(stored.with_id(id))
    }

    pub async fn delete(&self, owner_email: &str, id: DocId) -> Result<(), AppError> {
        self.get(owner_email, id).await?;
        if self.store.remove(PAYMENT_METHODS, &Filter::id(id)).await? == 0 {
            return Err(not_found());
        }
        info!(id, owner = %owner_email, "payment method removed");
        Ok(())
    }
}
