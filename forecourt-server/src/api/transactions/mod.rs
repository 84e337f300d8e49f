//! Transaction API 模块 (台账视角，管理员)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/transactions | GET | 台账列表 |
//! | /api/transactions/{number} | GET | 单笔交易 |
//! | /api/transactions/process-payment | POST | 代客付款 |
//! | /api/transactions/process-refund | POST | 退款 |
//!
//! 付款与 `/api/payments/process/{order_id}` 走同一个
//! [`crate::payment::PaymentService`]，语义完全一致。

mod handler;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};

use crate::auth::middleware::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/transactions", transaction_routes())
}

fn transaction_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/process-payment", post(handler::process_payment))
        .route("/process-refund", post(handler::process_refund))
        .route("/{number}", get(handler::get_by_number))
        .layer(from_fn(require_admin))
}
