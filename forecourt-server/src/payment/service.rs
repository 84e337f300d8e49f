//! Payment Service
//!
//! 唯一的支付/退款状态机服务。`/api/payments/*` 与 `/api/transactions/*`
//! 两个 HTTP 入口都只是它的适配器，前置条件与字段语义完全一致。

use chrono::Utc;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{CurrentUser, bare_key, ensure_owner_or_admin};
use crate::db::models::{
    Order, OrderStatus, PaymentMethod, PaymentOutcome, PaymentState, PaymentStatusView,
    RequestMetadata, TimelineEntry, Transaction, TransactionKind, TransactionStatus,
};
use crate::db::repository::{OrderRepository, SequenceRepository, TransactionRepository};
use crate::orders::numbering::{self, TXN_PREFIX};
use crate::payment::gateway::{ChargeRequest, GatewayError, PaymentGateway, RefundRequest};
use crate::utils::money;
use crate::utils::time::now_rfc3339;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct PaymentService {
    orders: OrderRepository,
    transactions: TransactionRepository,
    sequences: SequenceRepository,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(db: Surreal<Db>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            transactions: TransactionRepository::new(db.clone()),
            sequences: SequenceRepository::new(db),
            gateway,
        }
    }

    /// Process a payment for an order.
    ///
    /// Preconditions: requester owns the order (or is admin), order is
    /// `Pending` and unpaid, amount matches the order amount. Declines are
    /// journaled as `failed` ledger entries and surface as their own error
    /// kind; the order is left untouched. A second call on a paid order
    /// returns 409 and writes nothing.
    pub async fn process(
        &self,
        actor: &CurrentUser,
        order_id: &str,
        method: PaymentMethod,
        amount: f64,
        metadata: Option<RequestMetadata>,
    ) -> AppResult<PaymentOutcome> {
        let order = self.load_order(order_id).await?;
        ensure_owner_or_admin(actor, &order.customer_id)?;

        if order.payment.status == PaymentState::Paid {
            return Err(AppError::conflict("Order is already paid"));
        }
        if order.status != OrderStatus::Pending {
            return Err(AppError::business_rule(
                "Order cannot accept payment in its current status",
            ));
        }
        money::require_valid_amount(amount, "amount")?;
        if !money::money_eq(amount, order.amount) {
            return Err(AppError::validation(
                "Payment amount does not match order amount",
            ));
        }

        let number = self.next_number().await?;
        let charge = ChargeRequest {
            order_number: order.number.clone(),
            amount,
            currency: order.currency.clone(),
            method,
        };

        match self.gateway.capture(&charge).await {
            Ok(receipt) => {
                let entry = self.ledger_entry(
                    &order,
                    number.clone(),
                    TransactionKind::Payment,
                    amount,
                    method,
                    TransactionStatus::Completed,
                    metadata,
                );
                let entry = Transaction {
                    details: Some(receipt.details),
                    ..entry
                };
                let event = TimelineEntry {
                    status: OrderStatus::Processing,
                    timestamp: now_rfc3339(),
                    description: format!("Payment received ({})", method.as_str()),
                    actor_id: bare_key(&actor.id).to_string(),
                };
                let settled = self
                    .transactions
                    .record_payment(entry, &order.key(), event)
                    .await?;

                tracing::info!(
                    order = %order.number,
                    txn = %settled.number,
                    method = method.as_str(),
                    "Payment settled"
                );
                Ok(PaymentOutcome {
                    transaction_number: settled.number,
                    status: settled.status,
                    order_id: order.key(),
                })
            }
            Err(GatewayError::Declined(reason)) => {
                // Journal the failed attempt; the order stays untouched
                let entry = self.ledger_entry(
                    &order,
                    number,
                    TransactionKind::Payment,
                    amount,
                    method,
                    TransactionStatus::Failed,
                    metadata,
                );
                let failed = self.transactions.record_failure(entry).await?;
                tracing::warn!(
                    order = %order.number,
                    txn = %failed.number,
                    reason = %reason,
                    "Payment declined"
                );
                Err(AppError::payment_declined(reason))
            }
            Err(GatewayError::Unavailable(e)) => {
                Err(AppError::internal(format!("Payment gateway unavailable: {e}")))
            }
        }
    }

    /// Process a refund for a completed, paid order (admin surface).
    ///
    /// The original transaction must be a completed payment belonging to
    /// the same order, otherwise nothing is written.
    pub async fn refund(
        &self,
        actor: &CurrentUser,
        order_id: &str,
        original_number: &str,
        reason: &str,
    ) -> AppResult<PaymentOutcome> {
        let order = self.load_order(order_id).await?;

        if order.status != OrderStatus::Completed || order.payment.status != PaymentState::Paid {
            return Err(AppError::business_rule("Order cannot be refunded"));
        }

        let original = self
            .transactions
            .find_by_number(original_number)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Transaction {original_number} not found"))
            })?;

        if original.order_id != order.key() {
            return Err(AppError::business_rule(
                "Transaction does not belong to this order",
            ));
        }
        if original.kind != TransactionKind::Payment
            || original.status != TransactionStatus::Completed
        {
            return Err(AppError::business_rule(
                "Original transaction is not a completed payment",
            ));
        }

        let number = self.next_number().await?;
        let refund_req = RefundRequest {
            order_number: order.number.clone(),
            amount: original.amount,
            currency: original.currency.clone(),
            method: original.method,
            original_reference: original.number.clone(),
        };
        let receipt = match self.gateway.refund(&refund_req).await {
            Ok(receipt) => receipt,
            Err(GatewayError::Declined(reason)) => {
                return Err(AppError::payment_declined(reason));
            }
            Err(GatewayError::Unavailable(e)) => {
                return Err(AppError::internal(format!(
                    "Payment gateway unavailable: {e}"
                )));
            }
        };

        let entry = Transaction {
            details: Some(receipt.details),
            refund_of: Some(original.number.clone()),
            reason: Some(reason.to_string()),
            ..self.ledger_entry(
                &order,
                number,
                TransactionKind::Refund,
                original.amount,
                original.method,
                TransactionStatus::Completed,
                None,
            )
        };
        let event = TimelineEntry {
            status: OrderStatus::Refunded,
            timestamp: now_rfc3339(),
            description: format!("Refund issued: {reason}"),
            actor_id: bare_key(&actor.id).to_string(),
        };

        let refunded = self
            .transactions
            .record_refund(entry, &order.key(), &order.vehicle_id, event, &now_rfc3339())
            .await?;

        tracing::info!(
            order = %order.number,
            txn = %refunded.number,
            refund_of = %original.number,
            "Refund recorded"
        );
        Ok(PaymentOutcome {
            transaction_number: refunded.number,
            status: refunded.status,
            order_id: order.key(),
        })
    }

    /// Payment status view for an order, owner or admin
    pub async fn status(&self, actor: &CurrentUser, order_id: &str) -> AppResult<PaymentStatusView> {
        let order = self.load_order(order_id).await?;
        ensure_owner_or_admin(actor, &order.customer_id)?;

        let last_updated = order
            .timeline
            .last()
            .map(|e| e.timestamp.clone())
            .unwrap_or_else(|| order.created_at.clone());

        Ok(PaymentStatusView {
            status: order.payment.status,
            method: order.payment.method,
            transaction_number: order.payment.transaction_number,
            last_updated,
        })
    }

    /// Admin ledger listing with total count
    pub async fn list(&self, limit: i64, start: i64) -> AppResult<(Vec<Transaction>, i64)> {
        let entries = self.transactions.find_all(limit, start).await?;
        let total = self.transactions.count().await?;
        Ok((entries, total))
    }

    /// Fetch a ledger entry by number (admin)
    pub async fn get_by_number(&self, number: &str) -> AppResult<Transaction> {
        self.transactions
            .find_by_number(number)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Transaction {number} not found")))
    }

    async fn next_number(&self) -> AppResult<String> {
        let at = Utc::now();
        let seq = self
            .sequences
            .next(&numbering::month_scope(TXN_PREFIX, at))
            .await?;
        Ok(numbering::format_number(TXN_PREFIX, at, seq))
    }

    #[allow(clippy::too_many_arguments)]
    fn ledger_entry(
        &self,
        order: &Order,
        number: String,
        kind: TransactionKind,
        amount: f64,
        method: PaymentMethod,
        status: TransactionStatus,
        metadata: Option<RequestMetadata>,
    ) -> Transaction {
        Transaction {
            id: None,
            number,
            order_id: order.key(),
            order_number: order.number.clone(),
            customer_id: order.customer_id.clone(),
            kind,
            amount: money::round_money(amount),
            currency: order.currency.clone(),
            method,
            status,
            details: None,
            refund_of: None,
            reason: None,
            metadata,
            created_at: now_rfc3339(),
        }
    }

    async fn load_order(&self, order_id: &str) -> AppResult<Order> {
        let key = bare_key(order_id).to_string();
        self.orders
            .find_by_id(&key)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {key} not found")))
    }
}
