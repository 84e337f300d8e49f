//! Sequence Repository
//!
//! Monotonic per-month counters backing the human-readable order and
//! transaction numbers. A single `UPSERT ... SET value += 1` is atomic in
//! SurrealDB, so two concurrent creations in the same month can never see
//! the same value.

use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};

#[derive(Debug, Deserialize)]
struct Counter {
    value: i64,
}

#[derive(Clone)]
pub struct SequenceRepository {
    base: BaseRepository,
}

impl SequenceRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Atomically bump and return the next value for `scope` (e.g. "ord_2608")
    pub async fn next(&self, scope: &str) -> RepoResult<i64> {
        let mut result = self
            .base
            .db()
            .query("UPSERT type::thing('sequence', $scope) SET value += 1;")
            .bind(("scope", scope.to_string()))
            .await?;

        let counters: Vec<Counter> = result.take(0)?;
        counters
            .into_iter()
            .next()
            .map(|c| c.value)
            .ok_or_else(|| RepoError::Database(format!("Counter {scope} returned no value")))
    }
}
