//! Data models representing ledger entities.
//!
//! This module contains the data structures that map to database tables
//! along with the request/response bodies built around them.

/// Audit log transaction model
pub mod transaction;
/// Ledger user and balance model
pub mod user;
