//! Order Repository
//!
//! Order writes that touch the vehicle run in one database transaction:
//! the availability check, the order write and the vehicle flip either all
//! land or none do. Guards abort the transaction via `THROW`.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult, map_guard_error};
use crate::db::models::{AvailabilityStatus, Order, OrderNote, OrderStatus, TimelineEntry};

const TABLE: &str = "order";

/// Create the order and reserve the vehicle atomically.
///
/// The in-stock check happens inside the transaction, closing the
/// check-then-act race between two buyers of the same vehicle.
const CREATE_RESERVING: &str = r#"
BEGIN TRANSACTION;
LET $v = (SELECT * FROM ONLY type::thing('vehicle', $vehicle_key));
IF $v = NONE { THROW 'VEHICLE_NOT_FOUND'; };
IF $v.availability.status != 'In Stock' { THROW 'VEHICLE_NOT_AVAILABLE'; };
CREATE `order` CONTENT $order;
UPDATE type::thing('vehicle', $vehicle_key)
    SET availability.status = 'Reserved', availability.updated_at = $now;
COMMIT TRANSACTION;
"#;

const UPDATE_STATUS: &str = r#"
UPDATE type::thing('order', $order_key)
    SET status = $status, timeline += $event;
"#;

const UPDATE_STATUS_WITH_VEHICLE: &str = r#"
BEGIN TRANSACTION;
UPDATE type::thing('order', $order_key)
    SET status = $status, timeline += $event;
UPDATE type::thing('vehicle', $vehicle_key)
    SET availability.status = $vehicle_status, availability.updated_at = $now;
COMMIT TRANSACTION;
"#;

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a new order and flip its vehicle to `Reserved` in one
    /// database transaction. Fails without side effects when the vehicle
    /// is missing or not in stock.
    pub async fn create_reserving_vehicle(
        &self,
        order: Order,
        vehicle_key: &str,
        now: &str,
    ) -> RepoResult<Order> {
        let number = order.number.clone();

        self.base
            .db()
            .query(CREATE_RESERVING)
            .bind(("vehicle_key", vehicle_key.to_string()))
            .bind(("order", order))
            .bind(("now", now.to_string()))
            .await?
            .check()
            .map_err(map_guard_error)?;

        self.find_by_number(&number)
            .await?
            .ok_or_else(|| RepoError::Database(format!("Order {number} vanished after create")))
    }

    pub async fn find_by_id(&self, key: &str) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select((TABLE, key)).await?;
        Ok(order)
    }

    pub async fn find_by_number(&self, number: &str) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM `order` WHERE number = $number LIMIT 1")
            .bind(("number", number.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// All orders, newest first (admin listing)
    pub async fn find_all(&self, limit: i64, start: i64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM `order` ORDER BY created_at DESC LIMIT $limit START $start")
            .bind(("limit", limit))
            .bind(("start", start))
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn count(&self) -> RepoResult<i64> {
        // `order` collides with the ORDER keyword in raw SurrealQL
        super::count_table(self.base.db(), "`order`").await
    }

    /// Orders belonging to one customer, newest first
    pub async fn find_by_customer(
        &self,
        customer_key: &str,
        limit: i64,
        start: i64,
    ) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM `order` WHERE customer_id = $customer \
                 ORDER BY created_at DESC LIMIT $limit START $start",
            )
            .bind(("customer", customer_key.to_string()))
            .bind(("limit", limit))
            .bind(("start", start))
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn count_by_customer(&self, customer_key: &str) -> RepoResult<i64> {
        #[derive(serde::Deserialize)]
        struct CountRow {
            total: i64,
        }
        let mut result = self
            .base
            .db()
            .query("SELECT count() AS total FROM `order` WHERE customer_id = $customer GROUP ALL")
            .bind(("customer", customer_key.to_string()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.into_iter().next().map(|r| r.total).unwrap_or(0))
    }

    /// Apply a validated status transition, appending the timeline entry
    /// and flipping the vehicle in the same transaction when the new
    /// status has an inventory side effect.
    pub async fn update_status(
        &self,
        order_key: &str,
        status: OrderStatus,
        event: TimelineEntry,
        vehicle_flip: Option<(&str, AvailabilityStatus)>,
        now: &str,
    ) -> RepoResult<Order> {
        match vehicle_flip {
            Some((vehicle_key, vehicle_status)) => {
                self.base
                    .db()
                    .query(UPDATE_STATUS_WITH_VEHICLE)
                    .bind(("order_key", order_key.to_string()))
                    .bind(("status", status))
                    .bind(("event", event))
                    .bind(("vehicle_key", vehicle_key.to_string()))
                    .bind(("vehicle_status", vehicle_status))
                    .bind(("now", now.to_string()))
                    .await?
                    .check()
                    .map_err(map_guard_error)?;
            }
            None => {
                self.base
                    .db()
                    .query(UPDATE_STATUS)
                    .bind(("order_key", order_key.to_string()))
                    .bind(("status", status))
                    .bind(("event", event))
                    .await?
                    .check()?;
            }
        }

        self.find_by_id(order_key)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {order_key} not found")))
    }

    /// Append a note (notes are append-only, like the timeline)
    pub async fn add_note(&self, order_key: &str, note: OrderNote) -> RepoResult<Order> {
        self.base
            .db()
            .query("UPDATE type::thing('order', $order_key) SET notes += $note")
            .bind(("order_key", order_key.to_string()))
            .bind(("note", note))
            .await?
            .check()?;

        self.find_by_id(order_key)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {order_key} not found")))
    }
}
