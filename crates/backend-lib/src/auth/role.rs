// ============================
// backend-lib/src/auth/role.rs
// ============================
//! Account categories and the role gate protecting category-scoped routes.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::token::Claims;
use crate::error::AppError;

/// Account category. Each category is an independent identity namespace:
/// the same email may hold one account per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Restaurant,
    Supplier,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Customer, Role::Restaurant, Role::Supplier];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Restaurant => "restaurant",
            Role::Supplier => "supplier",
        }
    }

    /// Store collection holding accounts of this category
    pub fn collection(self) -> &'static str {
        match self {
            Role::Customer => "customers",
            Role::Restaurant => "restaurants",
            Role::Supplier => "suppliers",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AppError::Internal(format!("unknown role '{s}'")))
    }
}

/// Checks that verified claims carry one specific role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleGate {
    expected: Role,
}

/// Build a gate admitting only `expected`
pub fn require(expected: Role) -> RoleGate {
    RoleGate { expected }
}

impl RoleGate {
    /// Return the subject when the role matches, `Forbidden` otherwise
    pub fn authorize(&self, claims: &Claims) -> Result<String, AppError> {
        if claims.role == self.expected {
            Ok(claims.sub.clone())
        } else {
            tracing::debug!(
                expected = %self.expected,
                actual = %claims.role,
                "role gate rejected token"
            );
            Err(AppError::Forbidden)
        }
    }
}
