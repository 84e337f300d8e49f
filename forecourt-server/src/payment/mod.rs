//! Payment domain
//!
//! - [`gateway`] - 支付网关能力接口 + 模拟实现
//! - [`service`] - 支付/退款状态机服务

pub mod gateway;
pub mod service;

pub use gateway::{PaymentGateway, SimulatedGateway};
pub use service::PaymentService;
