//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查 (无需认证)
//! - [`vehicles`] - 车辆库存接口
//! - [`orders`] - 订单生命周期接口
//! - [`payments`] - 订单视角的支付接口
//! - [`transactions`] - 台账视角的支付接口 (管理员)

pub mod health;
pub mod orders;
pub mod payments;
pub mod transactions;
pub mod vehicles;

use axum::Router;
use axum::http::HeaderMap;
use axum::middleware::from_fn_with_state;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::require_auth;
use crate::core::ServerState;
use crate::db::models::RequestMetadata;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Assemble the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(vehicles::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(transactions::router())
        .layer(from_fn_with_state(state.clone(), require_auth))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Capture client metadata from request headers for the ledger
pub fn request_metadata(headers: &HeaderMap) -> RequestMetadata {
    RequestMetadata {
        ip: headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string()),
        user_agent: headers
            .get(http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string()),
    }
}
