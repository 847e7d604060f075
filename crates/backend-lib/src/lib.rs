// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the marketplace server.

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod payment;
pub mod payment_methods;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthService, DefaultAuth, LoginRateLimiter};
use crate::catalog::ProductCatalog;
use crate::config::Settings;
use crate::error::AppError;
use crate::payment::{OrderService, PaymentGateway, StripeGateway};
use crate::payment_methods::PaymentMethods;
use crate::storage::{DocumentStore, JsonFileStore};

pub use router::create_router;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Settings the server was started with
    pub settings: Arc<Settings>,
    pub catalog: ProductCatalog<S>,
    pub payment_methods: PaymentMethods<S>,
    pub orders: OrderService<S>,
    /// Failed-login throttle, shared with the auth service
    pub login_limiter: Arc<LoginRateLimiter>,
}

impl<S: DocumentStore> AppState<S> {
    /// Create a new application state talking to Stripe
    pub fn new(storage: S, settings: Settings) -> Result<Self, AppError> {
        let gateway = Arc::new(StripeGateway::new(&settings.payment));
        Self::with_gateway(storage, settings, gateway)
    }

    /// Create a new application state with an explicit payment gateway
    pub fn with_gateway(
        storage: S,
        settings: Settings,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Self, AppError> {
        let login_limiter = Arc::new(LoginRateLimiter::from_settings(&settings.rate_limit));
        let auth = Arc::new(DefaultAuth::new(
            storage.clone(),
            &settings.auth,
            login_limiter.clone(),
        )?);

        Ok(Self {
            auth,
            catalog: ProductCatalog::new(storage.clone()),
            payment_methods: PaymentMethods::new(storage.clone()),
            orders: OrderService::new(storage, gateway),
            settings: Arc::new(settings),
            login_limiter,
        })
    }
}

impl AppState<JsonFileStore> {
    /// Open the configured database file and build the state on top of it
    pub fn from_settings(settings: Settings) -> Result<Self, AppError> {
        let storage = JsonFileStore::open(&settings.storage.path)?;
        Self::new(storage, settings)
    }
}
