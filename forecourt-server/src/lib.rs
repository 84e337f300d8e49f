//! Forecourt Server - 车行销售后端
//!
//! # 架构概述
//!
//! - **库存** (`api/vehicles`): 车辆录入与库存状态
//! - **订单** (`orders`): 订单生命周期状态机
//! - **支付** (`payment`): 支付/退款服务 + 可替换网关
//! - **台账** (`api/transactions`): 资金流动审计记录
//! - **认证** (`auth`): JWT 认证体系
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//!
//! # 模块结构
//!
//! ```text
//! forecourt-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、归属检查
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 订单状态机与编号
//! ├── payment/       # 支付服务与网关
//! ├── db/            # 数据库层 (模型 + 仓储)
//! └── utils/         # 错误、日志、金额、时间
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod payment;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::OrderService;
pub use payment::{PaymentGateway, PaymentService, SimulatedGateway};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();

    let log_dir = std::env::var("LOG_DIR").ok();
    let log_level = std::env::var("LOG_LEVEL").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ______                                    __
   / ____/___  ________  _________  __  ______/ /_
  / /_  / __ \/ ___/ _ \/ ___/ __ \/ / / / __/ __/
 / __/ / /_/ / /  /  __/ /__/ /_/ / /_/ / /_/ /_
/_/    \____/_/   \___/\___/\____/\__,_/\__/\__/
    "#
    );
}
