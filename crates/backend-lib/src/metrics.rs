// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const ACCOUNT_REGISTERED: &str = "account.registered";
pub const ACCOUNT_DELETED: &str = "account.deleted";
pub const LOGIN_SUCCEEDED: &str = "login.succeeded";
pub const LOGIN_FAILED: &str = "login.failed";
pub const LOGIN_THROTTLED: &str = "login.throttled";
pub const RESET_REQUESTED: &str = "reset.requested";
pub const RESET_REDEEMED: &str = "reset.redeemed";
pub const PRODUCT_CREATED: &str = "product.created";
pub const CHECKOUT_CREATED: &str = "checkout.created";
pub const CHECKOUT_FAILED: &str = "checkout.failed";
pub const ORDER_PAID: &str = "order.paid";
