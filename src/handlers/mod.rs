//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params)
//! 2. Calls one balance service operation
//! 3. Returns HTTP response (JSON, status code)

/// Service health endpoint
pub mod health;
/// Top-up, transfer and history endpoints
pub mod transactions;
/// User creation and lookup endpoints
pub mod users;
