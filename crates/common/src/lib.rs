// ================
// common/src/lib.rs
// ================
//! Request and response bodies exchanged between marketplace clients and the
//! backend. Everything here is plain serde data; validation lives server-side.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Numeric document identifier assigned by the store
pub type DocId = u64;

/// Account registration payload, shared by every account category
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    /// Contact phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Company tax identifier (CNPJ for businesses)
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Plain acknowledgement
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reply to a forgot-password request.
///
/// `token_debug` is only ever populated when the server runs with reset-token
/// echo enabled, and is omitted from the JSON otherwise.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ForgotPasswordResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_debug: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Partial profile update; absent fields are left untouched
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Public view of an account
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub active: bool,
}

/// Product fields as submitted by a supplier
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Assigned from the authenticated supplier; client values are ignored
    #[serde(default)]
    pub supplier_id: DocId,

    #[serde(default)]
    pub sells_retail: bool,
    #[serde(default)]
    pub sells_wholesale: bool,
    #[serde(default)]
    pub retail_price: Option<f64>,
    #[serde(default)]
    pub wholesale_price: Option<f64>,

    #[serde(default)]
    pub initial_stock: u32,

    /// e.g. "own fleet" or "third party"
    #[serde(default)]
    pub delivery_type: Option<String>,
    #[serde(default)]
    pub additional_cost: f64,
    /// Free-form lead time, e.g. "3-5" days
    #[serde(default)]
    pub average_lead_time: Option<String>,

    #[serde(default)]
    pub promotion_start: Option<NaiveDate>,
    #[serde(default)]
    pub promotion_end: Option<NaiveDate>,
    #[serde(default)]
    pub discount_percent: Option<f64>,
}

/// Stored product with its document id
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: DocId,
    #[serde(flatten)]
    pub fields: ProductInput,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethodInput {
    /// e.g. "pix", "bank_transfer", "card"
    pub method: String,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PaymentMethod {
    pub id: DocId,
    pub owner_email: String,
    pub method: String,
    pub details: Option<String>,
}

/// One cart line submitted to checkout
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CartItem {
    pub name: String,
    /// Unit price in major currency units (e.g. 10.50)
    pub unit_price: f64,
    pub quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CheckoutRequest {
    pub items: Vec<CartItem>,
    /// Receipt address
    pub customer_email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CheckoutResponse {
    pub checkout_url: String,
    pub session_id: String,
}

/// Order lifecycle as tracked locally
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Order {
    pub id: DocId,
    pub email: String,
    /// Total in major currency units
    pub total: f64,
    pub status: OrderStatus,
    pub session_id: String,
    pub items: Vec<CartItem>,
}

/// Reply to the payment-processor redirect
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PaymentResultResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}
