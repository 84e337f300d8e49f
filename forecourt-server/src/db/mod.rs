//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine) plus schema definition.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "forecourt";
const DATABASE: &str = "main";

/// Unique indexes and table hints, applied idempotently on startup.
///
/// Numbers must be unique even under concurrent same-month creation;
/// the counter makes duplicates impossible and the index makes them fatal.
const SCHEMA: &str = r#"
DEFINE INDEX IF NOT EXISTS vehicle_vin ON TABLE vehicle COLUMNS vin UNIQUE;
DEFINE INDEX IF NOT EXISTS order_number ON TABLE `order` COLUMNS number UNIQUE;
DEFINE INDEX IF NOT EXISTS txn_number ON TABLE txn COLUMNS number UNIQUE;
"#;

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database at `db_path`
    pub async fn new(db_path: impl AsRef<std::path::Path>) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path.as_ref())
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::prepare(db).await
    }

    /// In-memory database (tests)
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<surrealdb::engine::local::Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        db.query(SCHEMA)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?
            .check()
            .map_err(|e| AppError::database(format!("Schema definition rejected: {e}")))?;

        tracing::info!("Database ready (ns={NAMESPACE}, db={DATABASE})");
        Ok(Self { db })
    }
}
