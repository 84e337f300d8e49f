//! Order API Handlers
//!
//! 只做参数转换和响应包装，业务规则都在 [`crate::orders::OrderService`] 里。

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::api::AppResponse;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{AddNoteRequest, Order, OrderCreate, StatusUpdateRequest};
use crate::utils::{AppResult, ListQuery, PagedResponse};

/// POST /api/orders - 创建订单
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<AppResponse<Order>>)> {
    let order = state.orders.create(&user, req).await?;
    Ok((StatusCode::CREATED, Json(AppResponse::success(order))))
}

/// GET /api/orders - 全部订单 (管理员)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PagedResponse<Order>>> {
    let (limit, start) = query.bounds();
    let (orders, total) = state.orders.list(limit, start).await?;
    Ok(Json(PagedResponse::new(
        orders,
        total,
        query.page(),
        query.per_page(),
    )))
}

/// GET /api/orders/my-orders - 当前用户的订单
pub async fn my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PagedResponse<Order>>> {
    let (limit, start) = query.bounds();
    let (orders, total) = state
        .orders
        .list_for_customer(&user.id, limit, start)
        .await?;
    Ok(Json(PagedResponse::new(
        orders,
        total,
        query.page(),
        query.per_page(),
    )))
}

/// GET /api/orders/{id} - 单个订单 (本人或管理员)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.orders.get(&user, &id).await?;
    Ok(Json(AppResponse::success(order)))
}

/// PATCH /api/orders/{id}/status - 状态转移 (管理员)
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<StatusUpdateRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state
        .orders
        .update_status(&user, &id, req.status, req.description)
        .await?;
    Ok(Json(AppResponse::success(order)))
}

/// PATCH /api/orders/{id}/cancel - 取消订单 (本人或管理员)
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.orders.cancel(&user, &id).await?;
    Ok(Json(AppResponse::success(order)))
}

/// POST /api/orders/{id}/notes - 追加备注 (本人或管理员)
pub async fn add_note(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<AddNoteRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let order = state.orders.add_note(&user, &id, req).await?;
    Ok(Json(AppResponse::success(order)))
}
