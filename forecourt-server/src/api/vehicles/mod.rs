//! Vehicle API 模块
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/vehicles | GET | 车辆列表 | 登录 |
//! | /api/vehicles/{id} | GET | 单台车辆 | 登录 |
//! | /api/vehicles | POST | 录入车辆 | 管理员 |
//! | /api/vehicles/{id}/availability | PATCH | 手动调整库存状态 | 管理员 |

mod handler;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, patch, post},
};

use crate::auth::middleware::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/vehicles", vehicle_routes())
}

fn vehicle_routes() -> Router<ServerState> {
    let admin_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}/availability", patch(handler::set_availability))
        .layer(from_fn(require_admin));

    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .merge(admin_routes)
}
