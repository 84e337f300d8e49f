//! Transaction Model
//!
//! 交易台账：每条记录一笔资金流动 (付款或退款)，挂在一个订单上。
//! 失败的支付尝试同样入账，状态为 `failed`。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::PaymentMethod;

/// Kind of monetary movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Payment,
    Refund,
}

/// Ledger entry status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Method-specific detail payload, mutually exclusive by construction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionDetails {
    BankTransfer { reference: String },
    Cash { receipt_number: String },
    Financing { loan_reference: String },
}

/// Request metadata captured at the HTTP boundary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

/// Ledger entry entity (table `txn`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Human-readable number "TXN-YYMM-NNNN"; unique
    pub number: String,
    /// Bare order key
    pub order_id: String,
    pub order_number: String,
    /// Bare user key of the paying customer
    pub customer_id: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub currency: String,
    pub method: PaymentMethod,
    pub status: TransactionStatus,
    /// Gateway-produced detail payload; absent for failed attempts
    pub details: Option<TransactionDetails>,
    /// Refund only: number of the original payment transaction
    pub refund_of: Option<String>,
    /// Refund only: operator-supplied reason
    pub reason: Option<String>,
    pub metadata: Option<RequestMetadata>,
    pub created_at: String,
}

// =============================================================================
// API Request / Response Types
// =============================================================================

/// Payment processing payload for the transaction-centric surface (admin)
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessPaymentRequest {
    pub order_id: String,
    pub payment_method: PaymentMethod,
    pub amount: f64,
}

/// Refund processing payload (admin)
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessRefundRequest {
    pub order_id: String,
    pub reason: String,
    /// Number of the original payment transaction being refunded
    pub transaction_number: String,
}

/// Payment processing payload for the order-centric surface
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentRequest {
    pub payment_method: PaymentMethod,
    pub amount: f64,
}

/// Outcome returned by both payment surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub transaction_number: String,
    pub status: TransactionStatus,
    pub order_id: String,
}

/// Payment status view for an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusView {
    pub status: super::PaymentState,
    pub method: Option<PaymentMethod>,
    pub transaction_number: Option<String>,
    pub last_updated: String,
}
