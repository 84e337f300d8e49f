//! Order state machine
//!
//! 显式状态转移表。任何不在表内的转移一律拒绝，而不是接受任意字符串。

use crate::db::models::{AvailabilityStatus, OrderStatus};
use crate::utils::{AppError, AppResult};

/// Is `from -> to` a legal transition?
pub fn is_legal(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Pending, Processing)
            | (Pending, Confirmed)
            | (Pending, Cancelled)
            | (Processing, Confirmed)
            | (Processing, Completed)
            | (Processing, Cancelled)
            | (Confirmed, Completed)
            | (Confirmed, Cancelled)
            | (Completed, Refunded)
    )
}

/// Validate a transition, returning a business-rule error when illegal
pub fn ensure_transition(from: OrderStatus, to: OrderStatus) -> AppResult<()> {
    if is_legal(from, to) {
        Ok(())
    } else {
        Err(AppError::business_rule(format!(
            "Illegal order status transition: {} -> {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

/// Inventory side effect of entering a status, if any.
///
/// `Completed` sells the vehicle; `Cancelled` and `Refunded` put it back
/// on the forecourt.
pub fn vehicle_effect(to: OrderStatus) -> Option<AvailabilityStatus> {
    match to {
        OrderStatus::Completed => Some(AvailabilityStatus::Sold),
        OrderStatus::Cancelled | OrderStatus::Refunded => Some(AvailabilityStatus::InStock),
        _ => None,
    }
}
