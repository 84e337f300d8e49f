//! Order domain
//!
//! - [`state_machine`] - 显式状态转移表
//! - [`numbering`] - 人类可读单号 (ORD-YYMM-NNNN)
//! - [`service`] - 订单生命周期服务

pub mod numbering;
pub mod service;
pub mod state_machine;

pub use service::OrderService;
