//! Database Models
//!
//! SurrealDB document shapes plus the API request/response types that
//! travel with them.

pub mod order;
pub mod serde_helpers;
pub mod transaction;
pub mod vehicle;

pub use order::{
    AddNoteRequest, DeliveryStatus, FinancingDetails, Order, OrderCreate, OrderNote, OrderPayment,
    OrderStatus, PaymentMethod, PaymentState, ShippingDetails, StatusUpdateRequest, TimelineEntry,
};
pub use transaction::{
    PaymentOutcome, PaymentRequest, PaymentStatusView, ProcessPaymentRequest, ProcessRefundRequest,
    RequestMetadata, Transaction, TransactionDetails, TransactionKind, TransactionStatus,
};
pub use vehicle::{
    AvailabilityStatus, AvailabilityUpdate, Vehicle, VehicleAvailability, VehicleCreate,
    VehiclePricing, default_currency,
};
