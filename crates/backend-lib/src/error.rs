// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::validation::ValidationError;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Password and confirmation do not match")]
    PasswordMismatch,

    #[error("Password exceeds {max} bytes")]
    InputTooLong { max: usize },

    #[error("Email already registered")]
    DuplicateEmail,

    /// Bad credentials, unknown or inactive account. Deliberately carries no
    /// detail about which check failed.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Insufficient permission for this resource")]
    Forbidden,

    #[error("Password reset token is invalid or expired")]
    InvalidOrExpiredToken,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication rate limit exceeded")]
    AuthRateLimited,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Payment gateway error: {0}")]
    Payment(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::PasswordMismatch | AppError::InputTooLong { .. } => {
                StatusCode::BAD_REQUEST
            },
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken(_) | AppError::MissingToken => {
                StatusCode::UNAUTHORIZED
            },
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::InvalidOrExpiredToken | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthRateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Payment(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Storage(_)
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::PasswordMismatch => "VAL_002",
            AppError::InputTooLong { .. } => "VAL_003",
            AppError::DuplicateEmail => "CONFLICT_001",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::InvalidToken(_) | AppError::MissingToken => "AUTH_002",
            AppError::AuthRateLimited => "AUTH_003",
            AppError::Forbidden => "AUTH_004",
            AppError::InvalidOrExpiredToken => "RESET_001",
            AppError::NotFound(_) => "NF_001",
            AppError::Payment(_) => "PAY_001",
            AppError::Config(_) => "CFG_001",
            AppError::Storage(_) => "STORE_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Whether the cause belongs in the server log rather than the response
    pub fn is_server_fault(&self) -> bool {
        self.status_code().is_server_error() || matches!(self, AppError::Payment(_))
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::PasswordMismatch => "Password and confirmation do not match".to_string(),
            AppError::InputTooLong { .. } => "Password is too long".to_string(),
            AppError::DuplicateEmail => "Email already registered".to_string(),
            AppError::InvalidCredentials => "Invalid email or password".to_string(),
            AppError::InvalidToken(_) | AppError::MissingToken => {
                "Could not validate credentials".to_string()
            },
            AppError::Forbidden => "Insufficient permission for this resource".to_string(),
            AppError::InvalidOrExpiredToken => {
                "Password reset token is invalid or expired".to_string()
            },
            AppError::NotFound(what) => format!("{what} not found"),
            AppError::AuthRateLimited => {
                "Too many authentication attempts, please try again later".to_string()
            },
            AppError::Payment(_) => "Error processing payment".to_string(),
            AppError::Config(_)
            | AppError::Storage(_)
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_fault() {
            tracing::error!(code = error_code, error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": self.sanitized_message(),
            }
        });

        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED && !matches!(self, AppError::InvalidCredentials) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

// Extractor rejections surface as 400s in the usual error body
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(ValidationError::MalformedRequest(rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(ValidationError::MalformedRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(ValidationError::MalformedRequest(rejection.body_text()))
    }
}
