// ============================
// crates/backend-lib/src/handlers/accounts.rs
// ============================
//! Registration, login, recovery and profile endpoints. The same handlers
//! serve every account category; the category comes from the router as an
//! `Extension<Role>`.
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension};
use marketplace_common::{
    ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, MessageResponse, Order,
    ProfileResponse, ProfileUpdate, RegisterRequest, ResetPasswordRequest, TokenResponse,
};

use super::extract::Json;
use crate::auth::{require, BearerToken, Role};
use crate::error::AppError;
use crate::storage::DocumentStore;
use crate::AppState;

pub async fn register<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(role): Extension<Role>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    state.auth.register(role, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Account registered successfully")),
    ))
}

pub async fn login<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(role): Extension<Role>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state.auth.login(role, &body.email, &body.password).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

pub async fn forgot_password<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(role): Extension<Role>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, AppError> {
    Ok(Json(state.auth.request_reset(role, &body.email).await?))
}

pub async fn reset_password<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(role): Extension<Role>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.redeem_reset(role, body).await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

pub async fn get_profile<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(role): Extension<Role>,
    token: BearerToken,
) -> Result<Json<ProfileResponse>, AppError> {
    let email = state.auth.authorize(token.as_str(), require(role))?;
    Ok(Json(state.auth.profile(role, &email).await?))
}

pub async fn update_profile<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(role): Extension<Role>,
    token: BearerToken,
    Json(body): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>, AppError> {
    let email = state.auth.authorize(token.as_str(), require(role))?;
    Ok(Json(state.auth.update_profile(role, &email, body).await?))
}

pub async fn delete_profile<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(role): Extension<Role>,
    token: BearerToken,
) -> Result<Json<MessageResponse>, AppError> {
    let email = state.auth.authorize(token.as_str(), require(role))?;
    state.auth.delete_account(role, &email).await?;
    Ok(Json(MessageResponse::new("Account deleted")))
}

/// Orders placed with the restaurant's email
pub async fn purchase_history<S: DocumentStore>(
    State(state): State<Arc<AppState<S>>>,
    token: BearerToken,
) -> Result<Json<Vec<Order>>, AppError> {
    let email = state.auth.authorize(token.as_str(), require(Role::Restaurant))?;
    Ok(Json(state.orders.history(&email).await?))
}
