//! Balance service - core business logic for moving money.
//!
//! This service handles:
//! - Amount and id validation
//! - Row locking in a deterministic order
//! - Balance checks and conditional balance updates
//! - Audit records for every movement
//!
//! # Atomicity Guarantees
//!
//! Top-ups and transfers run inside a single store transaction and walk
//! through the stages `Started → Locked → Validated → Mutated → Logged →
//! Committed`. A failure at any stage rolls the whole transaction back, so
//! no partial effect is ever visible. If the calling future is dropped
//! mid-operation the open transaction is dropped with it, which also rolls
//! back.
//!
//! The service keeps no in-process locks: concurrent operations on the same
//! user are serialized by the store's row locks.

use std::fmt;

use rust_decimal::Decimal;

use crate::{
    error::AppError,
    models::{
        transaction::{NewTransaction, Transaction},
        user::User,
    },
    store::{LedgerStore, LedgerTx, MAX_BALANCE, RECENT_TRANSACTIONS_LIMIT},
};

/// Maximum number of decimal places an amount may carry.
pub const AMOUNT_SCALE: u32 = 2;

/// Progress of a balance-changing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Started,
    Locked,
    Validated,
    Mutated,
    Logged,
    Committed,
    RolledBack,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Started => "started",
            Stage::Locked => "locked",
            Stage::Validated => "validated",
            Stage::Mutated => "mutated",
            Stage::Logged => "logged",
            Stage::Committed => "committed",
            Stage::RolledBack => "rolled_back",
        };
        f.write_str(name)
    }
}

/// Balances of both parties after a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub sender: User,
    pub receiver: User,
}

/// Orchestrates ledger store primitives into money-movement operations.
#[derive(Debug, Clone)]
pub struct BalanceService<S> {
    store: S,
}

impl<S: LedgerStore> BalanceService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Credit `amount` to a user from the system account.
    ///
    /// # Process
    ///
    /// 1. Validate amount (before touching the store)
    /// 2. Begin transaction and lock the user row
    /// 3. Apply the positive delta
    /// 4. Append one `top_up` record
    /// 5. Commit (or roll back on any error)
    ///
    /// # Errors
    ///
    /// - `InvalidRequest`: amount <= 0 or out of range, too many decimals,
    ///   bad id, or a resulting balance past [`MAX_BALANCE`]
    /// - `UserNotFound`: user doesn't exist
    /// - `Store`: store failure
    pub async fn top_up(&self, user_id: i64, amount: Decimal) -> Result<User, AppError> {
        validate_user_id(user_id)?;
        validate_amount(amount)?;

        let mut tx = self.store.begin().await?;
        let mut stage = Stage::Started;

        match top_up_steps(&mut tx, &mut stage, user_id, amount).await {
            Ok(user) => {
                commit(tx, "top_up").await?;
                tracing::info!(
                    user_id,
                    amount = %amount,
                    balance = %user.balance,
                    stage = %Stage::Committed,
                    "top-up committed"
                );
                Ok(user)
            }
            Err(err) => Err(abort(tx, "top_up", stage, err).await),
        }
    }

    /// Move `amount` from `sender_id` to `receiver_id`.
    ///
    /// Both rows are locked in ascending id order, so two transfers running
    /// in opposite directions between the same users cannot deadlock.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest`: amount <= 0, too many decimals, bad id, or
    ///   sender == receiver
    /// - `UserNotFound`: either user doesn't exist
    /// - `InsufficientBalance`: sender's balance is below `amount`
    /// - `Store`: store failure
    pub async fn transfer(
        &self,
        sender_id: i64,
        receiver_id: i64,
        amount: Decimal,
    ) -> Result<TransferOutcome, AppError> {
        validate_user_id(sender_id)?;
        validate_user_id(receiver_id)?;
        validate_amount(amount)?;
        if sender_id == receiver_id {
            return Err(AppError::InvalidRequest(
                "cannot transfer to the same user".to_string(),
            ));
        }

        let mut tx = self.store.begin().await?;
        let mut stage = Stage::Started;

        match transfer_steps(&mut tx, &mut stage, sender_id, receiver_id, amount).await {
            Ok(outcome) => {
                commit(tx, "transfer").await?;
                tracing::info!(
                    sender_id,
                    receiver_id,
                    amount = %amount,
                    stage = %Stage::Committed,
                    "transfer committed"
                );
                Ok(outcome)
            }
            Err(err) => Err(abort(tx, "transfer", stage, err).await),
        }
    }

    /// Most recent transactions involving a user, newest first.
    ///
    /// Returns an empty list for users without history.
    pub async fn get_transactions(&self, user_id: i64) -> Result<Vec<Transaction>, AppError> {
        validate_user_id(user_id)?;

        let transactions = self
            .store
            .list_recent_transactions(user_id, RECENT_TRANSACTIONS_LIMIT)
            .await?;

        Ok(transactions)
    }

    /// Create a user with the given starting balance.
    pub async fn create_user(&self, initial_balance: Decimal) -> Result<User, AppError> {
        if initial_balance < Decimal::ZERO {
            return Err(AppError::InvalidRequest(
                "initial balance must not be negative".to_string(),
            ));
        }
        validate_range(initial_balance)?;
        validate_scale(initial_balance)?;

        let user = self.store.create_user(initial_balance).await?;
        tracing::info!(user_id = user.id, balance = %user.balance, "user created");

        Ok(user)
    }

    /// Current balance of a user, without locking.
    pub async fn get_user(&self, user_id: i64) -> Result<User, AppError> {
        validate_user_id(user_id)?;
        Ok(self.store.get_user(user_id).await?)
    }
}

async fn top_up_steps<T: LedgerTx>(
    tx: &mut T,
    stage: &mut Stage,
    user_id: i64,
    amount: Decimal,
) -> Result<User, AppError> {
    tx.lock_user_for_update(user_id).await?;
    *stage = Stage::Locked;

    // Positive amounts were checked before the transaction opened
    *stage = Stage::Validated;

    let balance = tx.apply_balance_delta(user_id, amount).await?;
    *stage = Stage::Mutated;

    tx.append_transaction(NewTransaction::top_up(user_id, amount))
        .await?;
    *stage = Stage::Logged;

    Ok(User {
        id: user_id,
        balance,
    })
}

async fn transfer_steps<T: LedgerTx>(
    tx: &mut T,
    stage: &mut Stage,
    sender_id: i64,
    receiver_id: i64,
    amount: Decimal,
) -> Result<TransferOutcome, AppError> {
    let (low, high) = if sender_id < receiver_id {
        (sender_id, receiver_id)
    } else {
        (receiver_id, sender_id)
    };
    let low_user = tx.lock_user_for_update(low).await?;
    let high_user = tx.lock_user_for_update(high).await?;
    *stage = Stage::Locked;

    let sender = if low_user.id == sender_id {
        low_user
    } else {
        high_user
    };
    if sender.balance < amount {
        return Err(AppError::InsufficientBalance);
    }
    *stage = Stage::Validated;

    let sender_balance = tx.apply_balance_delta(sender_id, -amount).await?;
    let receiver_balance = tx.apply_balance_delta(receiver_id, amount).await?;
    *stage = Stage::Mutated;

    for record in NewTransaction::transfer_pair(sender_id, receiver_id, amount) {
        tx.append_transaction(record).await?;
    }
    *stage = Stage::Logged;

    Ok(TransferOutcome {
        sender: User {
            id: sender_id,
            balance: sender_balance,
        },
        receiver: User {
            id: receiver_id,
            balance: receiver_balance,
        },
    })
}

async fn commit<T: LedgerTx>(tx: T, operation: &'static str) -> Result<(), AppError> {
    if let Err(err) = tx.commit().await {
        tracing::warn!(
            operation,
            failed_at = %Stage::Logged,
            stage = %Stage::RolledBack,
            error = %err,
            "commit failed"
        );
        return Err(err.into());
    }
    Ok(())
}

/// Roll back after a failed step and hand the original error back.
async fn abort<T: LedgerTx>(
    tx: T,
    operation: &'static str,
    reached: Stage,
    err: AppError,
) -> AppError {
    if let Err(rollback_err) = tx.rollback().await {
        // The connection discards the transaction when it is dropped
        tracing::error!(operation, error = %rollback_err, "rollback failed");
    }
    tracing::warn!(
        operation,
        failed_at = %reached,
        stage = %Stage::RolledBack,
        error = %err,
        "operation rolled back"
    );
    err
}

fn validate_user_id(user_id: i64) -> Result<(), AppError> {
    if user_id <= 0 {
        return Err(AppError::InvalidRequest(format!(
            "invalid user id: {user_id}"
        )));
    }
    Ok(())
}

fn validate_amount(amount: Decimal) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidRequest(
            "amount must be positive".to_string(),
        ));
    }
    validate_range(amount)?;
    validate_scale(amount)
}

fn validate_range(amount: Decimal) -> Result<(), AppError> {
    if amount > MAX_BALANCE {
        return Err(AppError::InvalidRequest(format!(
            "amount must not exceed {MAX_BALANCE}"
        )));
    }
    Ok(())
}

fn validate_scale(amount: Decimal) -> Result<(), AppError> {
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(AppError::InvalidRequest(format!(
            "amount must have at most {AMOUNT_SCALE} decimal places"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::transaction::{SYSTEM_ACCOUNT_ID, TransactionKind},
        store::MemoryLedgerStore,
    };
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn service() -> BalanceService<MemoryLedgerStore> {
        BalanceService::new(MemoryLedgerStore::new())
    }

    // =========================================================================
    // Top-up
    // =========================================================================

    #[tokio::test]
    async fn top_up_adds_amount_and_records_one_entry() {
        let service = service();
        let user = service.create_user(dec!(100.0)).await.unwrap();

        let updated = service.top_up(user.id, dec!(50.0)).await.unwrap();

        assert_eq!(updated.balance, dec!(150.0));
        assert_eq!(service.store().balance_of(user.id), Some(dec!(150.0)));

        let records = service.store().all_transactions();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transaction_type, TransactionKind::TopUp);
        assert_eq!(records[0].sender_id, SYSTEM_ACCOUNT_ID);
        assert_eq!(records[0].receiver_id, user.id);
        assert_eq!(records[0].amount, dec!(50.0));
    }

    #[tokio::test]
    async fn top_up_rejects_non_positive_amounts() {
        let service = service();
        let user = service.create_user(dec!(10)).await.unwrap();

        for amount in [dec!(0), dec!(-5)] {
            let err = service.top_up(user.id, amount).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)));
        }

        assert_eq!(service.store().balance_of(user.id), Some(dec!(10)));
        assert!(service.store().all_transactions().is_empty());
    }

    #[tokio::test]
    async fn top_up_unknown_user_is_not_found() {
        let service = service();

        let err = service.top_up(77, dec!(1)).await.unwrap_err();

        assert!(matches!(err, AppError::UserNotFound(77)));
        assert!(service.store().all_transactions().is_empty());
    }

    #[tokio::test]
    async fn top_up_rolls_back_when_record_cannot_be_written() {
        let service = service();
        let user = service.create_user(dec!(10)).await.unwrap();
        service.store().set_append_failure(true);

        let err = service.top_up(user.id, dec!(5)).await.unwrap_err();

        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(service.store().balance_of(user.id), Some(dec!(10)));
        assert!(service.store().all_transactions().is_empty());
    }

    #[tokio::test]
    async fn amounts_beyond_column_range_are_rejected() {
        let service = service();
        let user = service.create_user(dec!(1)).await.unwrap();
        let other = service.create_user(dec!(0)).await.unwrap();

        for amount in [Decimal::MAX, dec!(10000000000000000000)] {
            assert!(matches!(
                service.top_up(user.id, amount).await,
                Err(AppError::InvalidRequest(_))
            ));
            assert!(matches!(
                service.transfer(user.id, other.id, amount).await,
                Err(AppError::InvalidRequest(_))
            ));
            assert!(matches!(
                service.create_user(amount).await,
                Err(AppError::InvalidRequest(_))
            ));
        }

        assert_eq!(service.store().balance_of(user.id), Some(dec!(1)));
        assert!(service.store().all_transactions().is_empty());
    }

    #[tokio::test]
    async fn top_up_past_maximum_balance_rolls_back() {
        let service = service();
        let user = service.create_user(MAX_BALANCE).await.unwrap();

        let err = service.top_up(user.id, dec!(0.01)).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(service.store().balance_of(user.id), Some(MAX_BALANCE));
        assert!(service.store().all_transactions().is_empty());
    }

    #[tokio::test]
    async fn amounts_with_sub_cent_precision_are_rejected() {
        let service = service();
        let user = service.create_user(dec!(10)).await.unwrap();

        let err = service.top_up(user.id, dec!(0.001)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));

        // Trailing zeros do not count
        service.top_up(user.id, dec!(1.500)).await.unwrap();
        assert_eq!(service.store().balance_of(user.id), Some(dec!(11.5)));
    }

    // =========================================================================
    // Transfer
    // =========================================================================

    #[tokio::test]
    async fn transfer_moves_money_and_writes_balanced_pair() {
        let service = service();
        let sender = service.create_user(dec!(100.0)).await.unwrap();
        let receiver = service.create_user(dec!(0.0)).await.unwrap();
        service.top_up(sender.id, dec!(50.0)).await.unwrap();

        let outcome = service
            .transfer(sender.id, receiver.id, dec!(30.0))
            .await
            .unwrap();

        assert_eq!(outcome.sender.balance, dec!(120.0));
        assert_eq!(outcome.receiver.balance, dec!(30.0));
        assert_eq!(service.store().balance_of(sender.id), Some(dec!(120.0)));
        assert_eq!(service.store().balance_of(receiver.id), Some(dec!(30.0)));

        let transfers: Vec<Transaction> = service
            .store()
            .all_transactions()
            .into_iter()
            .filter(|t| t.transaction_type == TransactionKind::Transfer)
            .collect();
        assert_eq!(transfers.len(), 2);
        assert_eq!(
            transfers.iter().map(|t| t.amount).sum::<Decimal>(),
            Decimal::ZERO
        );
        for record in &transfers {
            assert_eq!((record.sender_id, record.receiver_id), (sender.id, receiver.id));
        }
    }

    #[tokio::test]
    async fn transfer_rejects_non_positive_amounts_without_side_effects() {
        let service = service();
        let sender = service.create_user(dec!(10)).await.unwrap();
        let receiver = service.create_user(dec!(10)).await.unwrap();

        for amount in [dec!(0), dec!(-1), dec!(-0.01)] {
            let err = service
                .transfer(sender.id, receiver.id, amount)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)));
        }

        assert_eq!(service.store().balance_of(sender.id), Some(dec!(10)));
        assert_eq!(service.store().balance_of(receiver.id), Some(dec!(10)));
        assert!(service.store().all_transactions().is_empty());
    }

    #[tokio::test]
    async fn transfer_with_insufficient_funds_changes_nothing() {
        let service = service();
        let sender = service.create_user(dec!(20)).await.unwrap();
        let receiver = service.create_user(dec!(5)).await.unwrap();

        let err = service
            .transfer(sender.id, receiver.id, dec!(20.01))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InsufficientBalance));
        assert_eq!(service.store().balance_of(sender.id), Some(dec!(20)));
        assert_eq!(service.store().balance_of(receiver.id), Some(dec!(5)));
        assert!(service.store().all_transactions().is_empty());
    }

    #[tokio::test]
    async fn transfer_can_drain_balance_to_exactly_zero() {
        let service = service();
        let sender = service.create_user(dec!(20)).await.unwrap();
        let receiver = service.create_user(dec!(0)).await.unwrap();

        service
            .transfer(sender.id, receiver.id, dec!(20))
            .await
            .unwrap();

        assert_eq!(service.store().balance_of(sender.id), Some(dec!(0)));
        assert_eq!(service.store().balance_of(receiver.id), Some(dec!(20)));
    }

    #[tokio::test]
    async fn transfer_to_unknown_receiver_rolls_back() {
        let service = service();
        let sender = service.create_user(dec!(20)).await.unwrap();

        let err = service.transfer(sender.id, 999, dec!(5)).await.unwrap_err();

        assert!(matches!(err, AppError::UserNotFound(999)));
        assert_eq!(service.store().balance_of(sender.id), Some(dec!(20)));
        assert!(service.store().all_transactions().is_empty());
    }

    #[tokio::test]
    async fn transfer_to_self_or_invalid_ids_is_rejected() {
        let service = service();
        let user = service.create_user(dec!(20)).await.unwrap();

        assert!(matches!(
            service.transfer(user.id, user.id, dec!(1)).await,
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            service.transfer(0, user.id, dec!(1)).await,
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            service.transfer(user.id, -3, dec!(1)).await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn transfer_rolls_back_when_second_record_fails() {
        let service = service();
        let sender = service.create_user(dec!(50)).await.unwrap();
        let receiver = service.create_user(dec!(0)).await.unwrap();
        service.store().set_append_failure(true);

        let err = service
            .transfer(sender.id, receiver.id, dec!(10))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Store(_)));
        assert_eq!(service.store().balance_of(sender.id), Some(dec!(50)));
        assert_eq!(service.store().balance_of(receiver.id), Some(dec!(0)));
        assert!(service.store().all_transactions().is_empty());
    }

    // =========================================================================
    // Concurrency
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_transfers_lose_no_updates() {
        const N: i64 = 50;
        let service = service();
        let a = service.create_user(Decimal::from(N) * dec!(2.5)).await.unwrap();
        let b = service.create_user(dec!(7)).await.unwrap();
        let (a_id, b_id) = (a.id, b.id);

        let handles: Vec<_> = (0..N)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.transfer(a_id, b_id, dec!(2.5)).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(service.store().balance_of(a.id), Some(dec!(0)));
        assert_eq!(
            service.store().balance_of(b.id),
            Some(dec!(7) + Decimal::from(N) * dec!(2.5))
        );
        assert_eq!(service.store().all_transactions().len(), (2 * N) as usize);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overdrawing_concurrent_transfers_never_go_negative() {
        let service = service();
        let a = service.create_user(dec!(10)).await.unwrap();
        let b = service.create_user(dec!(0)).await.unwrap();
        let (a_id, b_id) = (a.id, b.id);

        let handles: Vec<_> = (0..25)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.transfer(a_id, b_id, dec!(1)).await })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(AppError::InsufficientBalance) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(succeeded, 10);
        assert_eq!(service.store().balance_of(a.id), Some(dec!(0)));
        assert_eq!(service.store().balance_of(b.id), Some(dec!(10)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn opposite_direction_transfers_do_not_deadlock() {
        let service = service();
        let a = service.create_user(dec!(1000)).await.unwrap();
        let b = service.create_user(dec!(1000)).await.unwrap();

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let service = service.clone();
                let (from, to) = if i % 2 == 0 { (a.id, b.id) } else { (b.id, a.id) };
                tokio::spawn(async move { service.transfer(from, to, dec!(3)).await })
            })
            .collect();

        let all = async {
            for handle in handles {
                handle.await.unwrap().unwrap();
            }
        };
        tokio::time::timeout(Duration::from_secs(10), all)
            .await
            .expect("transfers deadlocked");

        assert_eq!(service.store().balance_of(a.id), Some(dec!(1000)));
        assert_eq!(service.store().balance_of(b.id), Some(dec!(1000)));
    }

    #[tokio::test]
    async fn cancelled_transfer_releases_locks_and_leaves_no_trace() {
        let service = service();
        let sender = service.create_user(dec!(40)).await.unwrap();
        let receiver = service.create_user(dec!(0)).await.unwrap();

        // Hold the receiver row so the transfer parks after locking the sender
        let mut blocker = service.store().begin().await.unwrap();
        blocker.lock_user_for_update(receiver.id).await.unwrap();

        let (sender_id, receiver_id) = (sender.id, receiver.id);
        let pending = {
            let service = service.clone();
            tokio::spawn(async move { service.transfer(sender_id, receiver_id, dec!(10)).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!pending.is_finished());

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        blocker.rollback().await.unwrap();

        // The sender row must be free again
        let mut probe = service.store().begin().await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), probe.lock_user_for_update(sender.id))
            .await
            .expect("sender row still locked")
            .unwrap();
        drop(probe);

        assert_eq!(service.store().balance_of(sender.id), Some(dec!(40)));
        assert_eq!(service.store().balance_of(receiver.id), Some(dec!(0)));
        assert!(service.store().all_transactions().is_empty());
    }

    // =========================================================================
    // Reads and creation
    // =========================================================================

    #[tokio::test]
    async fn history_is_capped_at_ten_newest_first() {
        let service = service();
        let user = service.create_user(dec!(0)).await.unwrap();
        for i in 1..=12 {
            service.top_up(user.id, Decimal::from(i)).await.unwrap();
        }

        let history = service.get_transactions(user.id).await.unwrap();

        assert_eq!(history.len(), 10);
        let amounts: Vec<Decimal> = history.iter().map(|t| t.amount).collect();
        let expected: Vec<Decimal> = (3..=12).rev().map(Decimal::from).collect();
        assert_eq!(amounts, expected);
    }

    #[tokio::test]
    async fn history_includes_both_sides_of_transfers() {
        let service = service();
        let a = service.create_user(dec!(10)).await.unwrap();
        let b = service.create_user(dec!(0)).await.unwrap();
        service.transfer(a.id, b.id, dec!(4)).await.unwrap();

        assert_eq!(service.get_transactions(a.id).await.unwrap().len(), 2);
        assert_eq!(service.get_transactions(b.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn history_of_user_without_records_is_empty() {
        let service = service();
        let user = service.create_user(dec!(3)).await.unwrap();

        assert!(service.get_transactions(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_user_validates_initial_balance() {
        let service = service();

        let user = service.create_user(dec!(100.0)).await.unwrap();
        assert!(user.id > 0);
        assert_eq!(user.balance, dec!(100.0));

        assert!(matches!(
            service.create_user(dec!(-1)).await,
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            service.create_user(dec!(1.234)).await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn get_user_returns_committed_balance() {
        let service = service();
        let user = service.create_user(dec!(8)).await.unwrap();
        service.top_up(user.id, dec!(2)).await.unwrap();

        assert_eq!(service.get_user(user.id).await.unwrap().balance, dec!(10));
        assert!(matches!(
            service.get_user(404).await,
            Err(AppError::UserNotFound(404))
        ));
        assert!(matches!(
            service.get_user(0).await,
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn stage_names_are_snake_case() {
        assert_eq!(Stage::RolledBack.to_string(), "rolled_back");
        assert_eq!(Stage::Committed.to_string(), "committed");
    }
}
