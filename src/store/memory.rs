//! In-memory ledger store.
//!
//! Mirrors the PostgreSQL store's semantics closely enough to exercise the
//! balance service without a database:
//! - each user row has its own async lock, held by a transaction until it
//!   commits or is dropped
//! - writes are buffered in the transaction and applied in one step on
//!   commit, so an uncommitted transaction is never visible to readers
//! - committed records get their id at commit time and the transaction's
//!   start time as `created_at`, as `NOW()` does in PostgreSQL
//! - balances are bounded by the `NUMERIC(20, 2)` column range
//!
//! Faults can be injected to exercise rollback paths.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex as RowLock, OwnedMutexGuard};

use super::{LedgerStore, LedgerTx, MAX_BALANCE, StoreError, ensure_valid_user_id};
use crate::models::{
    transaction::{NewTransaction, Transaction},
    user::User,
};

/// Ledger store kept entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    ledger: Mutex<Ledger>,
    rows: Mutex<HashMap<i64, Arc<RowLock<()>>>>,
    fail_appends: AtomicBool,
}

/// Committed state.
#[derive(Debug, Default)]
struct Ledger {
    users: BTreeMap<i64, Decimal>,
    transactions: Vec<Transaction>,
    last_user_id: i64,
    last_transaction_id: i64,
}

impl Inner {
    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn row(&self, user_id: i64) -> Arc<RowLock<()>> {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        rows.entry(user_id).or_default().clone()
    }

    fn committed_balance(&self, user_id: i64) -> Option<Decimal> {
        self.ledger().users.get(&user_id).copied()
    }
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `append_transaction` fail with a write error.
    pub fn set_append_failure(&self, fail: bool) {
        self.inner.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Every committed record, oldest first.
    pub fn all_transactions(&self) -> Vec<Transaction> {
        self.inner.ledger().transactions.clone()
    }

    /// Committed balance of a user.
    pub fn balance_of(&self, user_id: i64) -> Option<Decimal> {
        self.inner.committed_balance(user_id)
    }
}

/// An open in-memory transaction.
///
/// Holds the row locks it has taken plus its buffered writes. Dropping it
/// releases the locks and forgets the writes.
pub struct MemoryLedgerTx {
    inner: Arc<Inner>,
    started_at: DateTime<Utc>,
    locks: HashMap<i64, OwnedMutexGuard<()>>,
    deltas: HashMap<i64, Decimal>,
    pending: Vec<NewTransaction>,
}

impl MemoryLedgerTx {
    /// Take the user's row lock unless this transaction already holds it.
    async fn acquire(&mut self, user_id: i64) {
        if self.locks.contains_key(&user_id) {
            return;
        }
        let guard = self.inner.row(user_id).lock_owned().await;
        self.locks.insert(user_id, guard);
    }

    /// Balance as seen from inside this transaction.
    fn current_balance(&self, user_id: i64) -> Result<Decimal, StoreError> {
        let committed = self
            .inner
            .committed_balance(user_id)
            .ok_or(StoreError::UserNotFound(user_id))?;
        let delta = self.deltas.get(&user_id).copied().unwrap_or_default();
        checked_balance(user_id, committed, delta)
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    type Tx = MemoryLedgerTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(MemoryLedgerTx {
            inner: Arc::clone(&self.inner),
            started_at: Utc::now(),
            locks: HashMap::new(),
            deltas: HashMap::new(),
            pending: Vec::new(),
        })
    }

    async fn get_user(&self, user_id: i64) -> Result<User, StoreError> {
        ensure_valid_user_id(user_id)?;

        let balance = self
            .inner
            .committed_balance(user_id)
            .ok_or(StoreError::UserNotFound(user_id))?;

        Ok(User {
            id: user_id,
            balance,
        })
    }

    async fn list_recent_transactions(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Transaction>, StoreError> {
        let ledger = self.inner.ledger();
        let mut transactions: Vec<Transaction> = ledger
            .transactions
            .iter()
            .filter(|t| t.sender_id == user_id || t.receiver_id == user_id)
            .cloned()
            .collect();

        transactions.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        transactions.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(transactions)
    }

    async fn create_user(&self, initial_balance: Decimal) -> Result<User, StoreError> {
        if initial_balance < Decimal::ZERO || initial_balance > MAX_BALANCE {
            return Err(StoreError::Write(
                "balance violates check constraint".to_string(),
            ));
        }

        let mut ledger = self.inner.ledger();
        ledger.last_user_id += 1;
        let id = ledger.last_user_id;
        ledger.users.insert(id, initial_balance);

        Ok(User {
            id,
            balance: initial_balance,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl LedgerTx for MemoryLedgerTx {
    async fn lock_user_for_update(&mut self, user_id: i64) -> Result<User, StoreError> {
        ensure_valid_user_id(user_id)?;

        // Users are never deleted, so checking before waiting is safe
        if self.inner.committed_balance(user_id).is_none() {
            return Err(StoreError::UserNotFound(user_id));
        }
        self.acquire(user_id).await;

        let balance = self.current_balance(user_id)?;

        Ok(User {
            id: user_id,
            balance,
        })
    }

    async fn apply_balance_delta(
        &mut self,
        user_id: i64,
        delta: Decimal,
    ) -> Result<Decimal, StoreError> {
        if self.inner.committed_balance(user_id).is_none() {
            return Err(StoreError::UserNotFound(user_id));
        }
        // An UPDATE locks the row even without a prior locked read
        self.acquire(user_id).await;

        let current = self.current_balance(user_id)?;
        let updated = checked_balance(user_id, current, delta)?;
        if updated < Decimal::ZERO {
            return Err(StoreError::InsufficientFunds(user_id));
        }

        *self.deltas.entry(user_id).or_default() += delta;
        Ok(updated)
    }

    async fn append_transaction(&mut self, record: NewTransaction) -> Result<(), StoreError> {
        if self.inner.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Write("transaction insert rejected".to_string()));
        }
        self.pending.push(record);
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        let mut ledger = self.inner.ledger();

        // Compute every new balance before writing any of them
        let mut updates = Vec::with_capacity(self.deltas.len());
        for (&user_id, &delta) in &self.deltas {
            if let Some(&balance) = ledger.users.get(&user_id) {
                updates.push((user_id, checked_balance(user_id, balance, delta)?));
            }
        }
        for (user_id, balance) in updates {
            ledger.users.insert(user_id, balance);
        }

        for record in self.pending {
            ledger.last_transaction_id += 1;
            let id = ledger.last_transaction_id;
            ledger.transactions.push(Transaction {
                id,
                sender_id: record.sender_id,
                receiver_id: record.receiver_id,
                amount: record.amount,
                transaction_type: record.transaction_type,
                created_at: self.started_at,
            });
        }

        // Row locks are released when `self.locks` drops, after the ledger
        // guard, so the next holder observes the committed balance.
        drop(ledger);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// `balance + delta`, refusing results the balance column cannot hold.
fn checked_balance(
    user_id: i64,
    balance: Decimal,
    delta: Decimal,
) -> Result<Decimal, StoreError> {
    balance
        .checked_add(delta)
        .filter(|updated| *updated <= MAX_BALANCE)
        .ok_or(StoreError::BalanceOverflow(user_id))
}
