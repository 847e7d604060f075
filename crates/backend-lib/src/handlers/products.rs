// ============================
// crates/backend-lib/src/handlers/products.rs
// ============================
use std::sync::Arc;

use axum::{extract::State, http::StatusCode};
use marketplace_common::{DocId, Product, ProductInput};
use serde::Deserialize;

use super::extract::{Json, Path, Query};
use crate::auth::{require, BearerToken, Role};
use crate::error::AppError;
use crate::storage::DocumentStore;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub supplier_id: Option<DocId>,
}

/// Account id of the supplier presenting `token`
async fn supplier_id<S: DocumentStore>(
    state: &AppState<S>,
    token: &BearerToken,
) -> Result<DocId, AppError> {
    let email = state.auth.authorize(token.as_str(), require(Role::Supplier))?;
    state.auth.account_id(Role::Supplier, &email).await
}

pub async fn create<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    token: BearerToken,
    Json(body): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let owner = supplier_id(&state, &token).await?;
    let product = state.catalog.create(owner, body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = match query.supplier_id {
        Some(supplier_id) => state.catalog.list_by_supplier(supplier_id).await?,
        None => state.catalog.list().await?,
    };
    Ok(Json(products))
}

pub async fn get<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<DocId>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.catalog.get(id).await?))
}

pub async fn replace<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<DocId>,
    token: BearerToken,
    Json(body): Json<ProductInput>,
) -> Result<Json<Product>, AppError> {
    let owner = supplier_id(&state, &token).await?;
    Ok(Json(state.catalog.replace(owner, id, body).await?))
}

pub async fn delete<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<DocId>,
    token: BearerToken,
) -> Result<StatusCode, AppError> {
    let owner = supplier_id(&state, &token).await?;
    state.catalog.delete(owner, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
