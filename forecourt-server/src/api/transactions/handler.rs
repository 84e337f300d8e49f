//! Transaction API Handlers (ledger surface, admin only)

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};

use crate::api::{AppResponse, request_metadata};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{
    PaymentOutcome, ProcessPaymentRequest, ProcessRefundRequest, Transaction,
};
use crate::utils::{AppResult, ListQuery, PagedResponse};

/// GET /api/transactions - 台账列表 (分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PagedResponse<Transaction>>> {
    let (limit, start) = query.bounds();
    let (entries, total) = state.payments.list(limit, start).await?;
    Ok(Json(PagedResponse::new(
        entries,
        total,
        query.page(),
        query.per_page(),
    )))
}

/// GET /api/transactions/{number} - 按单号查交易
pub async fn get_by_number(
    State(state): State<ServerState>,
    Path(number): Path<String>,
) -> AppResult<Json<AppResponse<Transaction>>> {
    let entry = state.payments.get_by_number(&number).await?;
    Ok(Json(AppResponse::success(entry)))
}

/// POST /api/transactions/process-payment - 代客付款
pub async fn process_payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    headers: HeaderMap,
    Json(req): Json<ProcessPaymentRequest>,
) -> AppResult<Json<AppResponse<PaymentOutcome>>> {
    let outcome = state
        .payments
        .process(
            &user,
            &req.order_id,
            req.payment_method,
            req.amount,
            Some(request_metadata(&headers)),
        )
        .await?;
    Ok(Json(AppResponse::success(outcome)))
}

/// POST /api/transactions/process-refund - 退款
pub async fn process_refund(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<ProcessRefundRequest>,
) -> AppResult<Json<AppResponse<PaymentOutcome>>> {
    let outcome = state
        .payments
        .refund(&user, &req.order_id, &req.transaction_number, &req.reason)
        .await?;
    Ok(Json(AppResponse::success(outcome)))
}
