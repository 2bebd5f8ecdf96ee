//! Ledger store: durable storage of user balances and the transaction log.
//!
//! The balance service only talks to storage through the two traits defined
//! here:
//! - [`LedgerStore`]: opens transactions and serves the lock-free reads
//! - [`LedgerTx`]: the locking and writing primitives, all scoped to one
//!   open transaction
//!
//! # Rollback Guarantees
//!
//! A [`LedgerTx`] that is dropped without [`LedgerTx::commit`] discards all of
//! its writes and releases its row locks. This covers early returns through
//! `?` as well as a request future being cancelled mid-operation.

mod error;
pub mod memory;
pub mod postgres;

pub use error::StoreError;
pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{
    transaction::{NewTransaction, Transaction},
    user::User,
};

/// Number of records returned by a history lookup.
pub const RECENT_TRANSACTIONS_LIMIT: i64 = 10;

/// Largest value a balance or amount column can hold: `NUMERIC(20, 2)`,
/// i.e. 999999999999999999.99.
pub const MAX_BALANCE: Decimal = Decimal::from_parts(1_661_992_959, 1_808_227_885, 5, false, 2);

/// Entry point into the ledger.
#[async_trait]
pub trait LedgerStore: Clone + Send + Sync + 'static {
    /// Handle to an open atomic transaction.
    type Tx: LedgerTx;

    /// Open a new atomic transaction.
    ///
    /// # Errors
    ///
    /// - `Connection`: no connection could be obtained
    async fn begin(&self) -> Result<Self::Tx, StoreError>;

    /// Non-locking read of a single user.
    async fn get_user(&self, user_id: i64) -> Result<User, StoreError>;

    /// Most recent records where the user is sender or receiver, newest first.
    ///
    /// Unknown users simply have no records.
    async fn list_recent_transactions(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Transaction>, StoreError>;

    /// Insert a user and read back the assigned identifier.
    async fn create_user(&self, initial_balance: Decimal) -> Result<User, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Operations available inside an open transaction.
#[async_trait]
pub trait LedgerTx: Send {
    /// Read a user and take an exclusive row lock held until the
    /// transaction ends.
    ///
    /// # Errors
    ///
    /// - `InvalidUserId`: `user_id` is not positive
    /// - `UserNotFound`: no such user
    async fn lock_user_for_update(&mut self, user_id: i64) -> Result<User, StoreError>;

    /// Add `delta` to the user's balance as a single check-and-set: the write
    /// only happens if the resulting balance is >= 0.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// - `InsufficientFunds`: the balance would go negative
    /// - `UserNotFound`: no such user
    async fn apply_balance_delta(
        &mut self,
        user_id: i64,
        delta: Decimal,
    ) -> Result<Decimal, StoreError>;

    /// Append an audit record.
    async fn append_transaction(&mut self, record: NewTransaction) -> Result<(), StoreError>;

    /// Make every write of this transaction durable and release its locks.
    async fn commit(self) -> Result<(), StoreError>;

    /// Discard every write of this transaction and release its locks.
    async fn rollback(self) -> Result<(), StoreError>;
}

/// Reject ids that can never name a user.
pub(crate) fn ensure_valid_user_id(user_id: i64) -> Result<(), StoreError> {
    if user_id <= 0 {
        return Err(StoreError::InvalidUserId(user_id));
    }
    Ok(())
}
