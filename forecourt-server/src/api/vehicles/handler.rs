//! Vehicle API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::AppResponse;
use crate::core::ServerState;
use crate::db::models::{
    AvailabilityStatus, AvailabilityUpdate, Vehicle, VehicleAvailability, VehicleCreate,
    VehiclePricing, default_currency,
};
use crate::db::repository::VehicleRepository;
use crate::utils::time::now_rfc3339;
use crate::utils::{AppError, AppResult, ListQuery, PagedResponse, money};

/// GET /api/vehicles - 车辆列表 (分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PagedResponse<Vehicle>>> {
    let repo = VehicleRepository::new(state.db.clone());
    let (limit, start) = query.bounds();
    let vehicles = repo.find_all(limit, start).await?;
    let total = repo.count().await?;
    Ok(Json(PagedResponse::new(
        vehicles,
        total,
        query.page(),
        query.per_page(),
    )))
}

/// GET /api/vehicles/{id} - 单台车辆
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Vehicle>>> {
    let repo = VehicleRepository::new(state.db.clone());
    let vehicle = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Vehicle {id} not found")))?;
    Ok(Json(AppResponse::success(vehicle)))
}

/// POST /api/vehicles - 录入车辆 (管理员)
pub async fn create(
    State(state): State<ServerState>,
    Json(req): Json<VehicleCreate>,
) -> AppResult<(StatusCode, Json<AppResponse<Vehicle>>)> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    money::require_valid_amount(req.base_price, "base_price")?;

    let repo = VehicleRepository::new(state.db.clone());
    let now = now_rfc3339();
    let vehicle = Vehicle {
        id: None,
        make: req.make,
        model: req.model,
        year: req.year,
        vin: req.vin.to_uppercase(),
        pricing: VehiclePricing {
            base_price: money::round_money(req.base_price),
            currency: req.currency.unwrap_or_else(default_currency),
        },
        availability: VehicleAvailability {
            status: AvailabilityStatus::InStock,
            updated_at: now.clone(),
        },
        created_at: now,
    };

    let created = repo.create(vehicle).await?;
    tracing::info!(vin = %created.vin, "Vehicle registered");
    Ok((StatusCode::CREATED, Json(AppResponse::success(created))))
}

/// PATCH /api/vehicles/{id}/availability - 手动调整库存状态 (管理员)
///
/// 只允许 `In Stock` 与 `In Transit` 互转。`Reserved` 和 `Sold`
/// 由订单生命周期维护，不接受手动写入。
pub async fn set_availability(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<AvailabilityUpdate>,
) -> AppResult<Json<AppResponse<Vehicle>>> {
    let repo = VehicleRepository::new(state.db.clone());
    let vehicle = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Vehicle {id} not found")))?;

    let manual = [AvailabilityStatus::InStock, AvailabilityStatus::InTransit];
    if !manual.contains(&req.status) || !manual.contains(&vehicle.availability.status) {
        return Err(AppError::business_rule(
            "Only In Stock and In Transit can be set manually",
        ));
    }

    let updated = repo
        .set_availability(&vehicle.key(), req.status, &now_rfc3339())
        .await?;
    tracing::info!(
        vehicle = %updated.key(),
        status = req.status.as_str(),
        "Vehicle availability changed"
    );
    Ok(Json(AppResponse::success(updated)))
}
