use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrderService;
use crate::payment::{PaymentGateway, PaymentService, SimulatedGateway};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | orders | OrderService | 订单生命周期服务 |
/// | payments | PaymentService | 支付/退款服务 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 订单服务
    pub orders: OrderService,
    /// 支付服务
    pub payments: PaymentService,
}

impl ServerState {
    /// 初始化生产状态: RocksDB 持久化 + 模拟支付网关
    ///
    /// 数据库打不开就无法提供任何服务，这里直接 panic。
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_service = DbService::new(config.database_dir())
            .await
            .expect("Failed to open database");

        let gateway: Arc<dyn PaymentGateway> = Arc::new(SimulatedGateway::new(
            config.gateway_latency,
            config.gateway_decline_rate,
        ));

        Self::with_db(config.clone(), db_service.db, gateway)
    }

    /// 从已有数据库连接构造状态 (测试用内存库走这里)
    pub fn with_db(config: Config, db: Surreal<Db>, gateway: Arc<dyn PaymentGateway>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let orders = OrderService::new(db.clone());
        let payments = PaymentService::new(db.clone(), gateway);

        Self {
            config,
            db,
            jwt_service,
            orders,
            payments,
        }
    }
}
