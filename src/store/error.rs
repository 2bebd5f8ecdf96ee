//! Ledger store error types.

/// Typed failures surfaced by a [`LedgerStore`](super::LedgerStore).
///
/// Infrastructure faults keep the underlying message so it can be logged;
/// the HTTP layer never shows it to callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    UserNotFound(i64),

    #[error("invalid user id: {0}")]
    InvalidUserId(i64),

    #[error("insufficient funds for user {0}")]
    InsufficientFunds(i64),

    #[error("balance of user {0} would exceed the maximum")]
    BalanceOverflow(i64),

    #[error("connection failure: {0}")]
    Connection(String),

    #[error("write failure: {0}")]
    Write(String),
}

/// Classify sqlx failures.
///
/// Pool exhaustion, IO and TLS problems mean the store could not be reached;
/// anything else happened while executing a statement.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_) => StoreError::Connection(err.to_string()),
            other => StoreError::Write(other.to_string()),
        }
    }
}
