//! PostgreSQL ledger store backed by a sqlx connection pool.
//!
//! Row locking uses `SELECT ... FOR UPDATE`. Balance changes are a single
//! conditional `UPDATE` so the non-negative check and the write cannot be
//! separated by a concurrent writer.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction as PgTransaction};

use super::{LedgerStore, LedgerTx, StoreError, ensure_valid_user_id};
use crate::{
    db::DbPool,
    models::{
        transaction::{NewTransaction, Transaction},
        user::User,
    },
};

/// Ledger store over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: DbPool,
}

impl PgLedgerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// An open PostgreSQL transaction.
///
/// Dropping it without committing rolls back (sqlx issues the ROLLBACK when
/// the connection returns to the pool).
pub struct PgLedgerTx {
    tx: PgTransaction<'static, Postgres>,
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    type Tx = PgLedgerTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(PgLedgerTx { tx })
    }

    async fn get_user(&self, user_id: i64) -> Result<User, StoreError> {
        ensure_valid_user_id(user_id)?;

        sqlx::query_as::<_, User>("SELECT id, balance FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::UserNotFound(user_id))
    }

    async fn list_recent_transactions(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Transaction>, StoreError> {
        // id breaks ties between records written by the same transaction
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, sender_id, receiver_id, amount, transaction_type, created_at
            FROM transactions
            WHERE sender_id = $1 OR receiver_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    async fn create_user(&self, initial_balance: Decimal) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (balance) VALUES ($1) RETURNING id, balance",
        )
        .bind(initial_balance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Write(e.to_string()))?;

        Ok(user)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(())
    }
}

/// SQLSTATE `numeric_value_out_of_range`.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// The balance column rejects values past `NUMERIC(20, 2)`.
fn overflow_or(user_id: i64, err: sqlx::Error) -> StoreError {
    let out_of_range = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == NUMERIC_OUT_OF_RANGE);

    if out_of_range {
        StoreError::BalanceOverflow(user_id)
    } else {
        err.into()
    }
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn lock_user_for_update(&mut self, user_id: i64) -> Result<User, StoreError> {
        ensure_valid_user_id(user_id)?;

        // FOR UPDATE holds the row until COMMIT/ROLLBACK
        sqlx::query_as::<_, User>("SELECT id, balance FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or(StoreError::UserNotFound(user_id))
    }

    async fn apply_balance_delta(
        &mut self,
        user_id: i64,
        delta: Decimal,
    ) -> Result<Decimal, StoreError> {
        let new_balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET balance = balance + $1
            WHERE id = $2 AND balance + $1 >= 0
            RETURNING balance
            "#,
        )
        .bind(delta)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| overflow_or(user_id, e))?;

        if let Some(balance) = new_balance {
            return Ok(balance);
        }

        // Nothing matched: tell a missing row apart from a failed check
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&mut *self.tx)
            .await?;

        if exists {
            Err(StoreError::InsufficientFunds(user_id))
        } else {
            Err(StoreError::UserNotFound(user_id))
        }
    }

    async fn append_transaction(&mut self, record: NewTransaction) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (sender_id, receiver_id, amount, transaction_type)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.sender_id)
        .bind(record.receiver_id)
        .bind(record.amount)
        .bind(record.transaction_type)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| StoreError::Write(e.to_string()))?;

        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
