//! HTTP router assembly.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{handlers, services::BalanceService, store::LedgerStore};

/// Build the application router around a balance service.
///
/// Generic over the store so the same routes can be served from PostgreSQL
/// in production and from the in-memory store in tests.
pub fn build_router<S: LedgerStore>(service: BalanceService<S>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check::<S>))
        .route("/user", post(handlers::users::create_user::<S>))
        .route("/user/{user_id}", get(handlers::users::get_user::<S>))
        .route("/balance/top-up", post(handlers::transactions::top_up::<S>))
        .route("/transfer", post(handlers::transactions::transfer::<S>))
        .route(
            "/transactions/{user_id}",
            get(handlers::transactions::get_transactions::<S>),
        )
        // Per-request spans
        .layer(TraceLayer::new_for_http())
        // Share the service with all handlers via State extraction
        .with_state(service)
}
