// ============================
// crates/backend-lib/src/payment/mod.rs
// ============================
//! Checkout through an external payment processor.

pub mod gateway;
pub mod orders;

pub use gateway::{CheckoutSession, CheckoutSessionRequest, LineItem, PaymentGateway, StripeGateway};
pub use orders::{to_cents, OrderService};
