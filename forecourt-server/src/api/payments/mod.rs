//! Payment API 模块 (订单视角)
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/payments/process/{order_id} | POST | 为订单付款 | 本人或管理员 |
//! | /api/payments/status/{order_id} | GET | 订单支付状态 | 本人或管理员 |
//!
//! 与 `/api/transactions` 共用同一个 [`crate::payment::PaymentService`]。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", payment_routes())
}

fn payment_routes() -> Router<ServerState> {
    Router::new()
        .route("/process/{order_id}", post(handler::process))
        .route("/status/{order_id}", get(handler::status))
}
