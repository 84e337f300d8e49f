//! Transaction (Ledger) Repository
//!
//! Writes that settle or refund an order pair the ledger entry with the
//! order update in one database transaction, guarded by `THROW` checks on
//! the order's current state.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, map_guard_error};
use crate::db::models::{TimelineEntry, Transaction};

const TABLE: &str = "txn";

/// Settle a payment: ledger entry + order payment/status update.
///
/// The already-paid guard runs inside the transaction, so a double submit
/// can never journal two settling payments.
const RECORD_PAYMENT: &str = r#"
BEGIN TRANSACTION;
LET $o = (SELECT * FROM ONLY type::thing('order', $order_key));
IF $o = NONE { THROW 'ORDER_NOT_FOUND'; };
IF $o.payment.status = 'paid' { THROW 'ORDER_ALREADY_PAID'; };
CREATE txn CONTENT $entry;
UPDATE type::thing('order', $order_key) SET
    status = 'processing',
    payment.status = 'paid',
    payment.method = $method,
    payment.transaction_number = $number,
    timeline += $event;
COMMIT TRANSACTION;
"#;

/// Record a refund: ledger entry + order flip + vehicle back to stock.
const RECORD_REFUND: &str = r#"
BEGIN TRANSACTION;
LET $o = (SELECT * FROM ONLY type::thing('order', $order_key));
IF $o = NONE { THROW 'ORDER_NOT_FOUND'; };
IF $o.status != 'completed' { THROW 'ORDER_NOT_REFUNDABLE'; };
CREATE txn CONTENT $entry;
UPDATE type::thing('order', $order_key) SET
    status = 'refunded',
    payment.status = 'refunded',
    timeline += $event;
UPDATE type::thing('vehicle', $vehicle_key)
    SET availability.status = 'In Stock', availability.updated_at = $now;
COMMIT TRANSACTION;
"#;

#[derive(Clone)]
pub struct TransactionRepository {
    base: BaseRepository,
}

impl TransactionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Journal a completed payment and settle the order atomically
    pub async fn record_payment(
        &self,
        entry: Transaction,
        order_key: &str,
        event: TimelineEntry,
    ) -> RepoResult<Transaction> {
        let number = entry.number.clone();
        let method = entry.method;

        self.base
            .db()
            .query(RECORD_PAYMENT)
            .bind(("order_key", order_key.to_string()))
            .bind(("entry", entry))
            .bind(("method", method))
            .bind(("number", number.clone()))
            .bind(("event", event))
            .await?
            .check()
            .map_err(map_guard_error)?;

        self.find_by_number(&number)
            .await?
            .ok_or_else(|| RepoError::Database(format!("Transaction {number} vanished after create")))
    }

    /// Journal a failed payment attempt. The order is left untouched;
    /// the ledger still keeps the evidence.
    pub async fn record_failure(&self, entry: Transaction) -> RepoResult<Transaction> {
        let created: Option<Transaction> = self.base.db().create(TABLE).content(entry).await?;
        created.ok_or_else(|| RepoError::Database("Failed to journal payment attempt".to_string()))
    }

    /// Journal a refund, flip the order to refunded and return the vehicle
    /// to stock, all in one transaction
    pub async fn record_refund(
        &self,
        entry: Transaction,
        order_key: &str,
        vehicle_key: &str,
        event: TimelineEntry,
        now: &str,
    ) -> RepoResult<Transaction> {
        let number = entry.number.clone();

        self.base
            .db()
            .query(RECORD_REFUND)
            .bind(("order_key", order_key.to_string()))
            .bind(("entry", entry))
            .bind(("event", event))
            .bind(("vehicle_key", vehicle_key.to_string()))
            .bind(("now", now.to_string()))
            .await?
            .check()
            .map_err(map_guard_error)?;

        self.find_by_number(&number)
            .await?
            .ok_or_else(|| RepoError::Database(format!("Transaction {number} vanished after create")))
    }

    pub async fn find_by_number(&self, number: &str) -> RepoResult<Option<Transaction>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM txn WHERE number = $number LIMIT 1")
            .bind(("number", number.to_string()))
            .await?;
        let entries: Vec<Transaction> = result.take(0)?;
        Ok(entries.into_iter().next())
    }

    /// Ledger entries for one order, oldest first
    pub async fn find_by_order(&self, order_key: &str) -> RepoResult<Vec<Transaction>> {
        let entries: Vec<Transaction> = self
            .base
            .db()
            .query("SELECT * FROM txn WHERE order_id = $order ORDER BY created_at")
            .bind(("order", order_key.to_string()))
            .await?
            .take(0)?;
        Ok(entries)
    }

    /// All ledger entries, newest first (admin listing)
    pub async fn find_all(&self, limit: i64, start: i64) -> RepoResult<Vec<Transaction>> {
        let entries: Vec<Transaction> = self
            .base
            .db()
            .query("SELECT * FROM txn ORDER BY created_at DESC LIMIT $limit START $start")
            .bind(("limit", limit))
            .bind(("start", start))
            .await?
            .take(0)?;
        Ok(entries)
    }

    pub async fn count(&self) -> RepoResult<i64> {
        super::count_table(self.base.db(), TABLE).await
    }
}
