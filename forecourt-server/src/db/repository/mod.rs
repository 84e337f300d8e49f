//! Repository Module
//!
//! Data access over the embedded SurrealDB. Multi-entity effects (order +
//! vehicle, ledger + order) run inside database transactions with `THROW`
//! guards so the in-state check and the write cannot be split by a
//! concurrent request.

pub mod order;
pub mod sequence;
pub mod transaction;
pub mod vehicle;

pub use order::OrderRepository;
pub use sequence::SequenceRepository;
pub use transaction::TransactionRepository;
pub use vehicle::VehicleRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用裸 key 比较
// =============================================================================
//
// 模型内的交叉引用 (order.customer_id, order.vehicle_id, txn.order_id)
// 存裸 key 字符串；查询时用 type::thing('table', $key) 还原 RecordId。

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// Count all records in a table
pub(crate) async fn count_table(db: &Surreal<Db>, table: &str) -> RepoResult<i64> {
    #[derive(serde::Deserialize)]
    struct CountRow {
        total: i64,
    }
    let mut result = db
        .query(format!("SELECT count() AS total FROM {table} GROUP ALL"))
        .await?;
    let rows: Vec<CountRow> = result.take(0)?;
    Ok(rows.into_iter().next().map(|r| r.total).unwrap_or(0))
}

/// Guard names thrown inside database transactions
pub(crate) mod guards {
    pub const VEHICLE_NOT_FOUND: &str = "VEHICLE_NOT_FOUND";
    pub const VEHICLE_NOT_AVAILABLE: &str = "VEHICLE_NOT_AVAILABLE";
    pub const ORDER_NOT_FOUND: &str = "ORDER_NOT_FOUND";
    pub const ORDER_ALREADY_PAID: &str = "ORDER_ALREADY_PAID";
    pub const ORDER_NOT_REFUNDABLE: &str = "ORDER_NOT_REFUNDABLE";
}

/// Map a transaction abort back to a typed repository error.
///
/// SurrealDB surfaces `THROW 'NAME'` as a query error containing the
/// thrown string; anything we did not throw ourselves stays a Database
/// error.
pub(crate) fn map_guard_error(err: surrealdb::Error) -> RepoError {
    let msg = err.to_string();
    if msg.contains(guards::VEHICLE_NOT_FOUND) {
        RepoError::NotFound("Vehicle not found".to_string())
    } else if msg.contains(guards::VEHICLE_NOT_AVAILABLE) {
        RepoError::Validation("Vehicle is not available for ordering".to_string())
    } else if msg.contains(guards::ORDER_NOT_FOUND) {
        RepoError::NotFound("Order not found".to_string())
    } else if msg.contains(guards::ORDER_ALREADY_PAID) {
        RepoError::Duplicate("Order is already paid".to_string())
    } else if msg.contains(guards::ORDER_NOT_REFUNDABLE) {
        RepoError::Validation("Order cannot be refunded".to_string())
    } else {
        RepoError::Database(msg)
    }
}
