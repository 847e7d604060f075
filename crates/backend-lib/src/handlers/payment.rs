// ============================
// crates/backend-lib/src/handlers/payment.rs
// ============================
//! Checkout and the processor's redirect targets.
use std::sync::Arc;

use axum::extract::State;
use marketplace_common::{CheckoutRequest, CheckoutResponse, PaymentResultResponse};
use serde::Deserialize;

use super::extract::{Json, Query};
use crate::error::AppError;
use crate::storage::DocumentStore;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

pub async fn checkout<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    Ok(Json(state.orders.checkout(body).await?))
}

pub async fn success<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<PaymentResultResponse>, AppError> {
    let order = state.orders.confirm(&query.session_id).await?;
    Ok(Json(PaymentResultResponse {
        message: "Payment completed successfully".to_string(),
        session_id: Some(order.session_id),
    }))
}

pub async fn cancel() -> Json<PaymentResultResponse> {
    Json(PaymentResultResponse {
        message: "Payment was cancelled by the customer".to_string(),
        session_id: None,
    })
}
