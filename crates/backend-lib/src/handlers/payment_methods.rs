// ============================
// crates/backend-lib/src/handlers/payment_methods.rs
// ============================
use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use marketplace_common::{DocId, MessageResponse, PaymentMethod, PaymentMethodInput};

use super::extract::{Json, Path};
use crate::auth::{require, BearerToken, Role};
use crate::error::AppError;
use crate::storage::DocumentStore;
use crate::AppState;

fn supplier<S: DocumentStore>(state: &AppState<S>, token: &BearerToken) -> Result<String, AppError> {
    state.auth.authorize(token.as_str(), require(Role::Supplier))
}

pub async fn create<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    token: BearerToken,
    Json(body): Json<PaymentMethodInput>,
) -> Result<(StatusCode, Json<PaymentMethod>), AppError> {
    let owner = supplier(&state, &token)?;
    let method = state.payment_methods.create(&owner, body).await?;
    Ok((StatusCode::CREATED, Json(method)))
}

pub async fn list<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    token: BearerToken,
) -> Result<Json<Vec<PaymentMethod>>, AppError> {
    let owner = supplier(&state, &token)?;
    Ok(Json(state.payment_methods.list(&owner).await?))
}

pub async fn get<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<DocId>,
    token: BearerToken,
) -> Result<Json<PaymentMethod>, AppError> {
    let owner = supplier(&state, &token)?;
    Ok(Json(state.payment_methods.get(&owner, id).await?))
}

pub async fn update<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<DocId>,
    token: BearerToken,
    Json(body): Json<PaymentMethodInput>,
) -> Result<Json<PaymentMethod>, AppError> {
    let owner = supplier(&state, &token)?;
    Ok(Json(state.payment_methods.update(&owner, id, body).await?))
}

pub async fn delete<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<DocId>,
    token: BearerToken,
) -> Result<Json<MessageResponse>, AppError> {
    let owner = supplier(&state, &token)?;
    state.payment_methods.delete(&owner, id).await?;
    Ok(Json(MessageResponse::new("Payment method removed")))
}
