// ============================
// crates/backend-lib/src/payment/orders.rs
// ============================
//! Checkout and the local order ledger.
use std::sync::Arc;

use ::metrics::counter;
use marketplace_common::{CartItem, CheckoutRequest, CheckoutResponse, Order, OrderStatus};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::gateway::{CheckoutSessionRequest, LineItem, PaymentGateway};
use crate::error::AppError;
use crate::metrics;
use crate::storage::{to_record, DocumentStore, Filter};
use crate::validation::{
    normalize_email, validate_cart, validate_email, ValidationError, ValidationResult,
};

pub const ORDERS: &str = "orders";

/// Convert a major-unit price to minor units, rounding to the nearest cent
pub fn to_cents(amount: f64) -> u64 {
    (amount * 100.0).round() as u64
}

/// Sum of `unit_amount * quantity` over the cart, refusing totals that do not
/// fit in a `u64`
pub fn total_cents(line_items: &[LineItem]) -> ValidationResult<u64> {
    line_items.iter().try_fold(0u64, |total, item| {
        item.unit_amount
            .checked_mul(u64::from(item.quantity))
            .and_then(|line| total.checked_add(line))
            .ok_or_else(|| {
                ValidationError::InvalidCart("The cart total is too large".to_string())
            })
    })
}

#[derive(Serialize)]
struct NewOrder<'a> {
    email: &'a str,
    total: f64,
    status: OrderStatus,
    session_id: &'a str,
    items: &'a [CartItem],
}

#[derive(Clone)]
pub struct OrderService<S> {
    store: S,
    gateway: Arc<dyn PaymentGateway>,
}

impl<S: DocumentStore> OrderService<S> {
    pub fn new(store: S, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { store, gateway }
    }

    /// Open a hosted checkout session and record a pending order for it
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutResponse, AppError> {
        validate_cart(&request.items)?;
        let email = normalize_email(&request.customer_email);
        validate_email(&email)?;

        let line_items: Vec<LineItem> = request
            .items
            .iter()
            .map(|item| LineItem {
                name: item.name.trim().to_string(),
                unit_amount: to_cents(item.unit_price),
                quantity: item.quantity,
            })
            .collect();
        let total_cents = total_cents(&line_items)?;

        let session = self
            .gateway
            .create_checkout_session(CheckoutSessionRequest {
                line_items,
                customer_email: email.clone(),
            })
            .await
            .inspect_err(|e| {
                counter!(metrics::CHECKOUT_FAILED).increment(1);
                warn!(error = %e, "checkout session not created");
            })?;

        let order = NewOrder {
            email: &email,
            total: total_cents as f64 / 100.0,
            status: OrderStatus::Pending,
            session_id: &session.id,
            items: &request.items,
        };
        let id = self.store.insert(ORDERS, to_record(&order)?).await?;

        counter!(metrics::CHECKOUT_CREATED).increment(1);
        info!(id, %email, session_id = %session.id, total_cents, "order pending payment");

        Ok(CheckoutResponse {
            checkout_url: session.url,
            session_id: session.id,
        })
    }

    /// Mark the order for `session_id` as paid
    pub async fn confirm(&self, session_id: &str) -> Result<Order, AppError> {
        let filter = Filter::eq("session_id", session_id);
        let updated = self
            .store
            .update(ORDERS, &filter, to_record(&json!({ "status": OrderStatus::Paid }))?)
            .await?;
        if updated == 0 {
            return Err(AppError::NotFound("Order".to_string()));
        }

        counter!(metrics::ORDER_PAID).increment(1);
        info!(%session_id, "order paid");

        self.store
            .find_one(ORDERS, &filter)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))?
            .into_typed_with_id()
    }

    /// Orders placed with `email`, oldest first
    pub async fn history(&self, email: &str) -> Result<Vec<Order>, AppError> {
        self.store
            .find_all(ORDERS, &Filter::eq("email", normalize_email(email)))
            .await?
            .into_iter()
            .map(|doc| doc.into_typed_with_id())
            .collect()
    }
}
