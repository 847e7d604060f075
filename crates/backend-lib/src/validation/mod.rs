// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request validation.

use std::sync::LazyLock;

use marketplace_common::{CartItem, PaymentMethodInput, ProductInput, RegisterRequest};
use regex::Regex;
use thiserror::Error;

use crate::auth::password::MAX_PASSWORD_BYTES;

const MAX_NAME_LENGTH: usize = 120;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_METHOD_LENGTH: usize = 50;
/// Largest unit amount the processor accepts, in minor units
pub const MAX_UNIT_AMOUNT_CENTS: u64 = 99_999_999;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .unwrap_or_else(|e| panic!("email pattern must compile: {e}"))
});

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    #[error("Invalid cart: {0}")]
    InvalidCart(String),

    /// Body, path or query could not be decoded
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Lowercase and trim an email so it can be used as a lookup key
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email address cannot be empty".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email address format".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a new password against the configured minimum length
pub fn validate_password(password: &str, min_length: usize) -> ValidationResult<&str> {
    if password.chars().count() < min_length {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {min_length} characters"
        )));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {MAX_PASSWORD_BYTES} bytes"
        )));
    }

    Ok(password)
}

/// Validate a display name
pub fn validate_name(name: &str) -> ValidationResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidName(
            "Name must not be empty".to_string(),
        ));
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "Name must be between 1 and {MAX_NAME_LENGTH} characters"
        )));
    }

    Ok(trimmed)
}

/// Validate the shape of a registration request. Password confirmation is
/// checked by the account service, which reports it as its own error kind.
pub fn validate_registration(request: &RegisterRequest, min_password: usize) -> ValidationResult<()> {
    validate_name(&request.name)?;
    validate_email(request.email.trim())?;
    validate_password(&request.password, min_password)?;
    Ok(())
}

fn non_negative(value: Option<f64>, field: &str) -> ValidationResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ValidationError::InvalidProduct(format!(
            "{field} must be a non-negative number"
        ))),
        _ => Ok(()),
    }
}

/// Validate product fields
pub fn validate_product(product: &ProductInput) -> ValidationResult<()> {
    if product.name.trim().is_empty() {
        return Err(ValidationError::InvalidProduct(
            "Product name must not be empty".to_string(),
        ));
    }

    non_negative(product.retail_price, "retail_price")?;
    non_negative(product.wholesale_price, "wholesale_price")?;
    non_negative(Some(product.additional_cost), "additional_cost")?;

    if let Some(discount) = product.discount_percent {
        if !(0.0..=100.0).contains(&discount) {
            return Err(ValidationError::InvalidProduct(
                "discount_percent must be between 0 and 100".to_string(),
            ));
        }
    }

    if let (Some(start), Some(end)) = (product.promotion_start, product.promotion_end) {
        if end < start {
            return Err(ValidationError::InvalidProduct(
                "promotion_end must not precede promotion_start".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validate a payment method
pub fn validate_payment_method(input: &PaymentMethodInput) -> ValidationResult<()> {
    let method = input.method.trim();
    if method.is_empty() || method.len() > MAX_METHOD_LENGTH {
        return Err(ValidationError::InvalidPaymentMethod(format!(
            "method must be between 1 and {MAX_METHOD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a checkout cart
pub fn validate_cart(items: &[CartItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::InvalidCart(
            "The cart must not be empty".to_string(),
        ));
    }

    for item in items {
        if item.name.trim().is_empty() {
            return Err(ValidationError::InvalidCart(
                "Every item needs a name".to_string(),
            ));
        }
        if item.quantity == 0 {
            return Err(ValidationError::InvalidCart(format!(
                "Quantity of '{}' must be at least 1",
                item.name
            )));
        }
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            return Err(ValidationError::InvalidCart(format!(
                "Price of '{}' must be a non-negative number",
                item.name
            )));
        }
        if (item.unit_price * 100.0).round() > MAX_UNIT_AMOUNT_CENTS as f64 {
            return Err(ValidationError::InvalidCart(format!(
                "Price of '{}' exceeds the maximum of {}.{:02}",
                item.name,
                MAX_UNIT_AMOUNT_CENTS / 100,
                MAX_UNIT_AMOUNT_CENTS % 100
            )));
        }
    }

    Ok(())
}
