// ============================
// crates/backend-lib/src/router.rs
// ============================
//! Route table.
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::auth::Role;
use crate::handlers::{self, accounts, payment, payment_methods, products};
use crate::storage::DocumentStore;
use crate::AppState;

/// Create the application router
pub fn create_router<S: DocumentStore>(state: Arc<AppState<S>>) -> Router {
    let restaurants = account_routes::<S>(Role::Restaurant)
        .route("/purchase-history", get(accounts::purchase_history::<S>));

    let suppliers = account_routes::<S>(Role::Supplier)
        .route(
            "/payment-methods",
            post(payment_methods::create::<S>).get(payment_methods::list::<S>),
        )
        .route(
            "/payment-methods/{id}",
            get(payment_methods::get::<S>)
                .put(payment_methods::update::<S>)
                .delete(payment_methods::delete::<S>),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/customers", account_routes::<S>(Role::Customer))
        .nest("/restaurants", restaurants)
        .nest("/suppliers", suppliers)
        .route(
            "/products",
            post(products::create::<S>).get(products::list::<S>),
        )
        .route(
            "/products/{id}",
            get(products::get::<S>)
                .put(products::replace::<S>)
                .delete(products::delete::<S>),
        )
        .route("/payment/checkout", post(payment::checkout::<S>))
        .route("/payment/success", get(payment::success::<S>))
        .route("/payment/cancel", get(payment::cancel))
        .with_state(state)
}

/// Account endpoints shared by every category; handlers read the category
/// from the `Role` extension
fn account_routes<S: DocumentStore>(role: Role) -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/register", post(accounts::register::<S>))
        .route("/login", post(accounts::login::<S>))
        .route("/forgot-password", post(accounts::forgot_password::<S>))
        .route("/reset-password", post(accounts::reset_password::<S>))
        .route(
            "/profile",
            get(accounts::get_profile::<S>)
                .put(accounts::update_profile::<S>)
                .delete(accounts::delete_profile::<S>),
        )
        .layer(Extension(role))
}
