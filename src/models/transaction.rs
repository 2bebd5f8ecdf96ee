//! Transaction data models and API request/response types.
//!
//! This module defines:
//! - `Transaction`: Immutable audit record of a balance movement
//! - `NewTransaction`: A record queued for insertion inside a store transaction
//! - Request and response types for top-up and transfer operations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::user::UserResponse;

/// Reserved user id recorded as the sender of every top-up.
///
/// Seeded by the initial migration; never returned by user creation.
pub const SYSTEM_ACCOUNT_ID: i64 = 0;

/// Kind of balance movement recorded in the audit log.
///
/// Maps to the `transaction_type` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money entering the ledger from the system account
    TopUp,
    /// Money moving between two users
    Transfer,
}

/// Represents a transaction record from the database.
///
/// # Database Table
///
/// Maps to the `transactions` table. Records are append-only.
///
/// # Sign Convention
///
/// A top-up is one positive record from the system account to the user.
/// A transfer is two records that both name sender → receiver: one with the
/// negative amount and one with the positive amount, so that the pair sums
/// to zero.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,

    /// Signed amount
    pub amount: Decimal,

    pub transaction_type: TransactionKind,

    /// Assigned by the store when the record is written
    pub created_at: DateTime<Utc>,
}

/// A transaction record that has not been written yet.
///
/// The store assigns the identifier and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub amount: Decimal,
    pub transaction_type: TransactionKind,
}

impl NewTransaction {
    /// Record for money credited to `user_id` from the system account.
    pub fn top_up(user_id: i64, amount: Decimal) -> Self {
        Self {
            sender_id: SYSTEM_ACCOUNT_ID,
            receiver_id: user_id,
            amount,
            transaction_type: TransactionKind::TopUp,
        }
    }

    /// The debit and credit halves of a transfer, in that order.
    pub fn transfer_pair(sender_id: i64, receiver_id: i64, amount: Decimal) -> [Self; 2] {
        let leg = |amount| Self {
            sender_id,
            receiver_id,
            amount,
            transaction_type: TransactionKind::Transfer,
        };
        [leg(-amount), leg(amount)]
    }
}

/// Request to top up a user's balance.
///
/// # JSON Example
///
/// ```json
/// {
///   "user_id": 1,
///   "amount": 50.00
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct TopUpRequest {
    pub user_id: i64,
    pub amount: Decimal,
}

/// Request to move money between two users.
///
/// # JSON Example
///
/// ```json
/// {
///   "sender_id": 1,
///   "receiver_id": 2,
///   "amount": 30.00
/// }
/// ```
///
/// # Atomicity Guarantee
///
/// Both balances and both audit records are written in the same database
/// transaction. Either everything is applied or nothing is.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub amount: Decimal,
}

/// Response returned after a successful top-up.
#[derive(Debug, Serialize, Deserialize)]
pub struct TopUpResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Response returned after a successful transfer.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    pub message: String,
    pub sender: UserResponse,
    pub receiver: UserResponse,
}
