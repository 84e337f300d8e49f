//! Vehicle Model
//!
//! Inventory record; `availability.status` gates order creation.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use validator::Validate;

/// Vehicle availability status
///
/// Wire form matches the showroom vocabulary ("In Stock", "Sold", ...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AvailabilityStatus {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Reserved")]
    Reserved,
    #[serde(rename = "Sold")]
    Sold,
    #[serde(rename = "In Transit")]
    InTransit,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::InStock => "In Stock",
            AvailabilityStatus::Reserved => "Reserved",
            AvailabilityStatus::Sold => "Sold",
            AvailabilityStatus::InTransit => "In Transit",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehiclePricing {
    pub base_price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

pub fn default_currency() -> String {
    "EUR".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleAvailability {
    pub status: AvailabilityStatus,
    pub updated_at: String,
}

/// Vehicle entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub make: String,
    pub model: String,
    pub year: i32,
    /// Vehicle identification number (unique index)
    pub vin: String,
    pub pricing: VehiclePricing,
    pub availability: VehicleAvailability,
    pub created_at: String,
}

impl Vehicle {
    /// Bare record key ("vehicle:abc" -> "abc"); empty when not yet persisted
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }
}

/// Create vehicle payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VehicleCreate {
    #[validate(length(min = 1, max = 64))]
    pub make: String,
    #[validate(length(min = 1, max = 64))]
    pub model: String,
    #[validate(range(min = 1950, max = 2100))]
    pub year: i32,
    #[validate(length(min = 5, max = 17))]
    pub vin: String,
    #[validate(range(min = 1.0))]
    pub base_price: f64,
    pub currency: Option<String>,
}

/// Availability update payload (admin)
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityUpdate {
    pub status: AvailabilityStatus,
}
