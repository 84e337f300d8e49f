//! Order API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/orders | POST | 创建订单 | 登录 |
//! | /api/orders/my-orders | GET | 当前用户的订单 | 登录 |
//! | /api/orders/{id} | GET | 单个订单 | 本人或管理员 |
//! | /api/orders/{id}/cancel | PATCH | 取消订单 | 本人或管理员 |
//! | /api/orders/{id}/notes | POST | 追加备注 | 本人或管理员 |
//! | /api/orders | GET | 全部订单 | 管理员 |
//! | /api/orders/{id}/status | PATCH | 状态转移 | 管理员 |

mod handler;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, patch, post},
};

use crate::auth::middleware::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    let admin_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}/status", patch(handler::update_status))
        .layer(from_fn(require_admin));

    Router::new()
        .route("/", post(handler::create))
        .route("/my-orders", get(handler::my_orders))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", patch(handler::cancel))
        .route("/{id}/notes", post(handler::add_note))
        .merge(admin_routes)
}
