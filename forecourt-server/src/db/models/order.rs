//! Order Model
//!
//! 订单主表：一个客户购买一台车。状态机见 `orders::state_machine`，
//! timeline 为追加式审计日志。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Order status
///
/// The authoritative set includes `Refunded`; legal transitions are
/// enforced by `orders::state_machine`, not here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Confirmed,
    Completed,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

/// Payment method for an order / transaction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Cash,
    Financing,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Financing => "financing",
        }
    }
}

/// Payment state of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Payment sub-record on an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPayment {
    pub method: Option<PaymentMethod>,
    pub status: PaymentState,
    /// Ledger number of the settling payment transaction
    pub transaction_number: Option<String>,
}

impl OrderPayment {
    pub fn pending(method: PaymentMethod) -> Self {
        Self {
            method: Some(method),
            status: PaymentState::Pending,
            transaction_number: None,
        }
    }
}

/// Delivery status of the shipping sub-record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Scheduled,
    Delivered,
}

/// Shipping sub-record
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShippingDetails {
    #[validate(length(min = 1, max = 200))]
    pub address_line: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    #[validate(length(min = 2, max = 64))]
    pub country: String,
    #[serde(default)]
    pub delivery_status: DeliveryStatus,
}

/// Optional financing sub-record
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FinancingDetails {
    #[validate(length(min = 1, max = 100))]
    pub provider: String,
    #[validate(range(min = 6, max = 120))]
    pub term_months: i32,
    #[validate(range(min = 1.0))]
    pub monthly_amount: f64,
}

/// Free-text note attributed to the adding user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderNote {
    pub text: String,
    pub author_id: String,
    pub created_at: String,
}

/// Append-only timeline entry recording a status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: OrderStatus,
    pub timestamp: String,
    pub description: String,
    pub actor_id: String,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Human-readable number "ORD-YYMM-NNNN"; immutable once set
    pub number: String,
    /// Bare user key, normalized at the API boundary
    pub customer_id: String,
    /// Bare vehicle key
    pub vehicle_id: String,
    pub status: OrderStatus,
    /// Copied from the vehicle base price at creation; never re-validated
    pub amount: f64,
    pub currency: String,
    pub payment: OrderPayment,
    pub shipping: ShippingDetails,
    pub financing: Option<FinancingDetails>,
    #[serde(default)]
    pub notes: Vec<OrderNote>,
    pub timeline: Vec<TimelineEntry>,
    pub created_at: String,
}

impl Order {
    /// Bare record key; empty when not yet persisted
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }
}

// =============================================================================
// API Request Types
// =============================================================================

/// Create order payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderCreate {
    #[validate(length(min = 1))]
    pub vehicle_id: String,
    pub payment_method: PaymentMethod,
    #[validate(nested)]
    pub shipping: ShippingDetails,
    #[validate(nested)]
    pub financing: Option<FinancingDetails>,
}

/// Status update payload (admin)
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
    pub description: Option<String>,
}

/// Add note payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddNoteRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
}
