// ============================
// crates/backend-lib/src/payment/gateway.rs
// ============================
//! Hosted checkout sessions at the payment processor.
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::PaymentSettings;
use crate::error::AppError;

/// One priced cart line, amounts in minor currency units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub unit_amount: u64,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub line_items: Vec<LineItem>,
    pub customer_email: String,
}

/// Session created by the processor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Boundary to the external payment processor
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, AppError>;
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Stripe Checkout over its form-encoded REST API
#[derive(Debug, Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    currency: String,
    success_url: String,
    cancel_url: String,
}

impl StripeGateway {
    pub fn new(settings: &PaymentSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: settings.stripe_api_key.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            currency: settings.currency.to_lowercase(),
            success_url: settings.success_url.clone(),
            cancel_url: settings.cancel_url.clone(),
        }
    }

    /// Refuse to call out with a missing, placeholder or publishable key
    fn ensure_configured(&self) -> Result<(), AppError> {
        if self.api_key.is_empty() || self.api_key.contains("placeholder") {
            return Err(AppError::Config("payment API key is not configured".to_string()));
        }
        if self.api_key.starts_with("pk_") {
            return Err(AppError::Config(
                "payment API key must be a secret key (sk_...)".to_string(),
            ));
        }
        Ok(())
    }

    fn form(&self, request: &CheckoutSessionRequest) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[]".to_string(), "card".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("customer_email".to_string(), request.customer_email.clone()),
        ];

        for (i, item) in request.line_items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            form.push((
                format!("{prefix}[price_data][currency]"),
                self.currency.clone(),
            ));
            form.push((
                format!("{prefix}[price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("{prefix}[price_data][unit_amount]"),
                item.unit_amount.to_string(),
            ));
            form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        }
        form
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, AppError> {
        self.ensure_configured()?;

        let url = format!("{}/v1/checkout/sessions", self.api_base);
        debug!(items = request.line_items.len(), "creating checkout session");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .form(&self.form(&request))
            .send()
            .await
            .map_err(|e| AppError::Payment(format!("checkout request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| status.to_string());
            warn!(%status, %detail, "processor rejected checkout session");
            return Err(AppError::Payment(detail));
        }

        response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| AppError::Payment(format!("unexpected checkout response: {e}")))
    }
}
