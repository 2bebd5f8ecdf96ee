//! Balance ledger service library.
//!
//! Exposes the store, service and HTTP layers so the binary and the
//! integration tests assemble the same application.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::AppError;
pub use router::build_router;
pub use services::BalanceService;
