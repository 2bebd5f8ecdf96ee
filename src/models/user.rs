//! User data models and API request/response types.
//!
//! This module defines:
//! - `User`: Database entity holding a user's balance
//! - `CreateUserRequest`: Request body for creating users
//! - `UserResponse`: Response body returned to clients

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a user record from the database.
///
/// # Database Table
///
/// Maps to the `users` table. The balance is a fixed-point `NUMERIC`
/// and must be >= 0 after every committed operation (enforced by a
/// CHECK constraint and by the conditional balance update).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct User {
    /// System-assigned identifier, always positive for real users
    pub id: i64,

    /// Current balance
    pub balance: Decimal,
}

/// Request body for creating a new user.
///
/// # JSON Example
///
/// ```json
/// {
///   "balance": 100.00
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Initial balance (defaults to 0 if not provided)
    #[serde(default)]
    pub balance: Decimal,
}

/// Response body for user endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 42,
///   "balance": "100.00"
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub balance: Decimal,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            balance: user.balance,
        }
    }
}
