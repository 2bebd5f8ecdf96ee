//! Money movement HTTP handlers.
//!
//! This module implements the balance-changing API endpoints:
//! - POST /balance/top-up - Add money to a user's balance
//! - POST /transfer - Move money between users
//! - GET /transactions/{user_id} - Recent transaction history

use crate::{
    error::AppError,
    models::transaction::{
        TopUpRequest, TopUpResponse, Transaction, TransferRequest, TransferResponse,
    },
    services::BalanceService,
    store::LedgerStore,
};
use axum::{
    Json,
    extract::{Path, State},
};

/// Top up a user's balance.
///
/// # Request Body
///
/// ```json
/// {
///   "user_id": 1,
///   "amount": 50.00
/// }
/// ```
///
/// # Response (200)
///
/// ```json
/// {
///   "message": "Balance topped up successfully",
///   "user": { "id": 1, "balance": "150.00" }
/// }
/// ```
pub async fn top_up<S: LedgerStore>(
    State(service): State<BalanceService<S>>,
    Json(request): Json<TopUpRequest>,
) -> Result<Json<TopUpResponse>, AppError> {
    let user = service.top_up(request.user_id, request.amount).await?;

    Ok(Json(TopUpResponse {
        message: "Balance topped up successfully".to_string(),
        user: user.into(),
    }))
}

/// Transfer money between users.
///
/// # Atomicity
///
/// Both balances and both audit records are written in a single store
/// transaction. Either all of it succeeds or none of it does.
///
/// # Validation
///
/// - Amount must be positive
/// - Sender must have sufficient balance
/// - Users must be different
pub async fn transfer<S: LedgerStore>(
    State(service): State<BalanceService<S>>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, AppError> {
    let outcome = service
        .transfer(request.sender_id, request.receiver_id, request.amount)
        .await?;

    Ok(Json(TransferResponse {
        message: "Transfer successful".to_string(),
        sender: outcome.sender.into(),
        receiver: outcome.receiver.into(),
    }))
}

/// List the ten most recent transactions involving a user, newest first.
///
/// Returns an empty array when the user has no history.
pub async fn get_transactions<S: LedgerStore>(
    State(service): State<BalanceService<S>>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let transactions = service.get_transactions(user_id).await?;

    Ok(Json(transactions))
}
