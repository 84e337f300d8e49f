//! Order Service
//!
//! 订单生命周期的唯一入口：创建、状态转移、取消、备注、查询。
//! HTTP 层只做参数转换，所有前置条件检查都在这里。

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use validator::Validate;

use crate::auth::{CurrentUser, bare_key, ensure_owner_or_admin};
use crate::db::models::{
    AddNoteRequest, AvailabilityStatus, Order, OrderCreate, OrderNote, OrderPayment, OrderStatus,
    TimelineEntry,
};
use crate::db::repository::{OrderRepository, SequenceRepository, VehicleRepository};
use crate::orders::numbering::{self, ORDER_PREFIX};
use crate::orders::state_machine;
use crate::utils::time::now_rfc3339;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    vehicles: VehicleRepository,
    sequences: SequenceRepository,
}

impl OrderService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            vehicles: VehicleRepository::new(db.clone()),
            sequences: SequenceRepository::new(db),
        }
    }

    /// Create an order for an in-stock vehicle.
    ///
    /// The amount is copied from the vehicle's base price at this moment
    /// and never changes afterwards. The vehicle flips to `Reserved` in
    /// the same database transaction as the order write.
    pub async fn create(&self, actor: &CurrentUser, req: OrderCreate) -> AppResult<Order> {
        req.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let vehicle_key = bare_key(&req.vehicle_id).to_string();
        let vehicle = self
            .vehicles
            .find_by_id(&vehicle_key)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Vehicle {vehicle_key} not found")))?;

        // Fast-fail; the authoritative check re-runs inside the transaction
        if vehicle.availability.status != AvailabilityStatus::InStock {
            return Err(AppError::business_rule(
                "Vehicle is not available for ordering",
            ));
        }

        let at = Utc::now();
        let now = now_rfc3339();
        let seq = self
            .sequences
            .next(&numbering::month_scope(ORDER_PREFIX, at))
            .await?;
        let number = numbering::format_number(ORDER_PREFIX, at, seq);

        let order = Order {
            id: None,
            number: number.clone(),
            customer_id: bare_key(&actor.id).to_string(),
            vehicle_id: vehicle_key.clone(),
            status: OrderStatus::Pending,
            amount: vehicle.pricing.base_price,
            currency: vehicle.pricing.currency.clone(),
            payment: OrderPayment::pending(req.payment_method),
            shipping: req.shipping,
            financing: req.financing,
            notes: Vec::new(),
            timeline: vec![TimelineEntry {
                status: OrderStatus::Pending,
                timestamp: now.clone(),
                description: "Order created".to_string(),
                actor_id: bare_key(&actor.id).to_string(),
            }],
            created_at: now.clone(),
        };

        let created = self
            .orders
            .create_reserving_vehicle(order, &vehicle_key, &now)
            .await?;

        tracing::info!(
            order = %number,
            vehicle = %vehicle_key,
            customer = %bare_key(&actor.id),
            "Order created, vehicle reserved"
        );
        Ok(created)
    }

    /// Admin status transition through the state machine
    pub async fn update_status(
        &self,
        actor: &CurrentUser,
        order_id: &str,
        target: OrderStatus,
        description: Option<String>,
    ) -> AppResult<Order> {
        let order = self.load(order_id).await?;
        self.transition(actor, order, target, description).await
    }

    /// Owner-or-admin cancellation, same state machine as any transition
    pub async fn cancel(&self, actor: &CurrentUser, order_id: &str) -> AppResult<Order> {
        let order = self.load(order_id).await?;
        ensure_owner_or_admin(actor, &order.customer_id)?;
        self.transition(
            actor,
            order,
            OrderStatus::Cancelled,
            Some("Order cancelled".to_string()),
        )
        .await
    }

    async fn transition(
        &self,
        actor: &CurrentUser,
        order: Order,
        target: OrderStatus,
        description: Option<String>,
    ) -> AppResult<Order> {
        state_machine::ensure_transition(order.status, target)?;

        let now = now_rfc3339();
        let event = TimelineEntry {
            status: target,
            timestamp: now.clone(),
            description: description
                .unwrap_or_else(|| format!("Status changed to {}", target.as_str())),
            actor_id: bare_key(&actor.id).to_string(),
        };

        let flip = state_machine::vehicle_effect(target);
        let vehicle_key = order.vehicle_id.clone();
        let updated = self
            .orders
            .update_status(
                &order.key(),
                target,
                event,
                flip.map(|status| (vehicle_key.as_str(), status)),
                &now,
            )
            .await?;

        tracing::info!(
            order = %updated.number,
            from = order.status.as_str(),
            to = target.as_str(),
            "Order status changed"
        );
        Ok(updated)
    }

    /// Append a note, owner or admin
    pub async fn add_note(
        &self,
        actor: &CurrentUser,
        order_id: &str,
        req: AddNoteRequest,
    ) -> AppResult<Order> {
        req.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        let order = self.load(order_id).await?;
        ensure_owner_or_admin(actor, &order.customer_id)?;

        let note = OrderNote {
            text: req.text,
            author_id: bare_key(&actor.id).to_string(),
            created_at: now_rfc3339(),
        };
        Ok(self.orders.add_note(&order.key(), note).await?)
    }

    /// Fetch one order, owner or admin
    pub async fn get(&self, actor: &CurrentUser, order_id: &str) -> AppResult<Order> {
        let order = self.load(order_id).await?;
        ensure_owner_or_admin(actor, &order.customer_id)?;
        Ok(order)
    }

    /// Admin listing with total count
    pub async fn list(&self, limit: i64, start: i64) -> AppResult<(Vec<Order>, i64)> {
        let orders = self.orders.find_all(limit, start).await?;
        let total = self.orders.count().await?;
        Ok((orders, total))
    }

    /// One customer's orders with total count
    pub async fn list_for_customer(
        &self,
        customer_id: &str,
        limit: i64,
        start: i64,
    ) -> AppResult<(Vec<Order>, i64)> {
        let key = bare_key(customer_id).to_string();
        let orders = self.orders.find_by_customer(&key, limit, start).await?;
        let total = self.orders.count_by_customer(&key).await?;
        Ok((orders, total))
    }

    pub(crate) async fn load(&self, order_id: &str) -> AppResult<Order> {
        let key = bare_key(order_id).to_string();
        self.orders
            .find_by_id(&key)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {key} not found")))
    }
}
