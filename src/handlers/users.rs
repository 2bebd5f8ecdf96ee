//! User HTTP handlers.
//!
//! - POST /user - Create a user with an initial balance
//! - GET /user/{user_id} - Current balance of a user

use crate::{
    error::AppError,
    models::user::{CreateUserRequest, UserResponse},
    services::BalanceService,
    store::LedgerStore,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// Create a new user.
///
/// # Request Body
///
/// ```json
/// {
///   "balance": 100.00
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: `{"id": 1, "balance": "100.00"}`
/// - **Error (400)**: negative balance or too many decimal places
pub async fn create_user<S: LedgerStore>(
    State(service): State<BalanceService<S>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = service.create_user(request.balance).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get a user's current balance.
pub async fn get_user<S: LedgerStore>(
    State(service): State<BalanceService<S>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = service.get_user(user_id).await?;

    Ok(Json(user.into()))
}
