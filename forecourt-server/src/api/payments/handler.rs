//! Payment API Handlers (order-centric surface)

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};

use crate::api::{AppResponse, request_metadata};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{PaymentOutcome, PaymentRequest, PaymentStatusView};
use crate::utils::AppResult;

/// POST /api/payments/process/{order_id} - 为订单付款
pub async fn process(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<PaymentRequest>,
) -> AppResult<Json<AppResponse<PaymentOutcome>>> {
    let outcome = state
        .payments
        .process(
            &user,
            &order_id,
            req.payment_method,
            req.amount,
            Some(request_metadata(&headers)),
        )
        .await?;
    Ok(Json(AppResponse::success(outcome)))
}

/// GET /api/payments/status/{order_id} - 订单支付状态
pub async fn status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
) -> AppResult<Json<AppResponse<PaymentStatusView>>> {
    let view = state.payments.status(&user, &order_id).await?;
    Ok(Json(AppResponse::success(view)))
}
