//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle store transactions, validation, and multi-step operations.

pub mod balance_service;

pub use balance_service::{BalanceService, TransferOutcome};
