//! 订单生命周期集成测试
//!
//! 使用内存数据库和可控网关，直接驱动服务层。

use std::collections::HashSet;
use std::sync::Arc;

use forecourt_server::db::DbService;
use forecourt_server::db::models::{
    AvailabilityStatus, DeliveryStatus, OrderCreate, OrderStatus, PaymentMethod, PaymentState,
    ShippingDetails, TransactionKind, TransactionStatus, Vehicle, VehicleAvailability,
    VehiclePricing,
};
use forecourt_server::db::repository::{TransactionRepository, VehicleRepository};
use forecourt_server::orders::OrderService;
use forecourt_server::payment::{PaymentGateway, PaymentService, SimulatedGateway};
use forecourt_server::{AppError, CurrentUser};

struct TestEnv {
    db: surrealdb::Surreal<surrealdb::engine::local::Db>,
    orders: OrderService,
    payments: PaymentService,
}

async fn env_with(gateway: Arc<dyn PaymentGateway>) -> TestEnv {
    let db = DbService::memory().await.expect("memory db").db;
    TestEnv {
        orders: OrderService::new(db.clone()),
        payments: PaymentService::new(db.clone(), gateway),
        db,
    }
}

async fn env() -> TestEnv {
    env_with(Arc::new(SimulatedGateway::always_approve())).await
}

fn customer(id: &str) -> CurrentUser {
    CurrentUser {
        id: format!("user:{id}"),
        username: id.to_string(),
        role: "customer".to_string(),
    }
}

fn admin() -> CurrentUser {
    CurrentUser {
        id: "user:admin1".to_string(),
        username: "admin1".to_string(),
        role: "admin".to_string(),
    }
}

fn shipping() -> ShippingDetails {
    ShippingDetails {
        address_line: "1 Test Street".to_string(),
        city: "Lisbon".to_string(),
        postal_code: "1000-001".to_string(),
        country: "PT".to_string(),
        delivery_status: DeliveryStatus::Pending,
    }
}

async fn seed_vehicle(env: &TestEnv, vin: &str, price: f64) -> Vehicle {
    let repo = VehicleRepository::new(env.db.clone());
    repo.create(Vehicle {
        id: None,
        make: "Toyota".to_string(),
        model: "Corolla".to_string(),
        year: 2024,
        vin: vin.to_string(),
        pricing: VehiclePricing {
            base_price: price,
            currency: "EUR".to_string(),
        },
        availability: VehicleAvailability {
            status: AvailabilityStatus::InStock,
            updated_at: "2026-08-01T00:00:00.000Z".to_string(),
        },
        created_at: "2026-08-01T00:00:00.000Z".to_string(),
    })
    .await
    .expect("seed vehicle")
}

fn order_req(vehicle_key: &str) -> OrderCreate {
    OrderCreate {
        vehicle_id: vehicle_key.to_string(),
        payment_method: PaymentMethod::BankTransfer,
        shipping: shipping(),
        financing: None,
    }
}

async fn vehicle_status(env: &TestEnv, key: &str) -> AvailabilityStatus {
    VehicleRepository::new(env.db.clone())
        .find_by_id(key)
        .await
        .expect("find vehicle")
        .expect("vehicle exists")
        .availability
        .status
}

#[tokio::test]
async fn test_create_order_reserves_vehicle_and_copies_amount() {
    let env = env().await;
    let vehicle = seed_vehicle(&env, "VIN0001", 31999.5).await;
    let buyer = customer("alice");

    let order = env
        .orders
        .create(&buyer, order_req(&vehicle.key()))
        .await
        .expect("create order");

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.amount, 31999.5);
    assert_eq!(order.currency, "EUR");
    assert_eq!(order.customer_id, "alice");
    assert!(order.number.starts_with("ORD-"));
    assert_eq!(order.payment.status, PaymentState::Pending);

    assert_eq!(order.timeline.len(), 1);
    assert_eq!(order.timeline[0].status, OrderStatus::Pending);
    assert_eq!(order.timeline[0].actor_id, "alice");

    assert_eq!(
        vehicle_status(&env, &vehicle.key()).await,
        AvailabilityStatus::Reserved
    );
}

#[tokio::test]
async fn test_order_on_reserved_vehicle_rejected_without_side_effects() {
    let env = env().await;
    let vehicle = seed_vehicle(&env, "VIN0002", 20000.0).await;

    env.orders
        .create(&customer("alice"), order_req(&vehicle.key()))
        .await
        .expect("first order");

    let err = env
        .orders
        .create(&customer("bob"), order_req(&vehicle.key()))
        .await
        .expect_err("second order must fail");
    assert!(matches!(err, AppError::BusinessRule(_)));

    let (_, total) = env.orders.list(10, 0).await.expect("list orders");
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_payment_settles_order_and_second_attempt_conflicts() {
    let env = env().await;
    let vehicle = seed_vehicle(&env, "VIN0003", 25000.0).await;
    let buyer = customer("carol");

    let order = env
        .orders
        .create(&buyer, order_req(&vehicle.key()))
        .await
        .expect("create order");

    let outcome = env
        .payments
        .process(&buyer, &order.key(), PaymentMethod::BankTransfer, 25000.0, None)
        .await
        .expect("payment");
    assert_eq!(outcome.status, TransactionStatus::Completed);
    assert!(outcome.transaction_number.starts_with("TXN-"));

    let paid = env.orders.get(&buyer, &order.key()).await.expect("reload");
    assert_eq!(paid.status, OrderStatus::Processing);
    assert_eq!(paid.payment.status, PaymentState::Paid);
    assert_eq!(
        paid.payment.transaction_number.as_deref(),
        Some(outcome.transaction_number.as_str())
    );

    // Payment does not sell the car yet
    assert_eq!(
        vehicle_status(&env, &vehicle.key()).await,
        AvailabilityStatus::Reserved
    );

    let err = env
        .payments
        .process(&buyer, &order.key(), PaymentMethod::BankTransfer, 25000.0, None)
        .await
        .expect_err("double payment");
    assert!(matches!(err, AppError::Conflict(_)));

    let entries = TransactionRepository::new(env.db.clone())
        .find_by_order(&order.key())
        .await
        .expect("ledger");
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_completion_sells_vehicle() {
    let env = env().await;
    let vehicle = seed_vehicle(&env, "VIN0004", 18000.0).await;
    let buyer = customer("dave");

    let order = env
        .orders
        .create(&buyer, order_req(&vehicle.key()))
        .await
        .expect("create");
    env.payments
        .process(&buyer, &order.key(), PaymentMethod::Cash, 18000.0, None)
        .await
        .expect("pay");

    let admin = admin();
    env.orders
        .update_status(&admin, &order.key(), OrderStatus::Confirmed, None)
        .await
        .expect("confirm");
    let done = env
        .orders
        .update_status(&admin, &order.key(), OrderStatus::Completed, None)
        .await
        .expect("complete");

    assert_eq!(done.status, OrderStatus::Completed);
    assert_eq!(
        vehicle_status(&env, &vehicle.key()).await,
        AvailabilityStatus::Sold
    );
    // Every transition left a timeline entry
    assert_eq!(done.timeline.len(), 4);
}

#[tokio::test]
async fn test_declined_payment_journaled_and_order_untouched() {
    let env = env_with(Arc::new(SimulatedGateway::always_decline())).await;
    let vehicle = seed_vehicle(&env, "VIN0005", 40000.0).await;
    let buyer = customer("erin");

    let order = env
        .orders
        .create(&buyer, order_req(&vehicle.key()))
        .await
        .expect("create");

    let err = env
        .payments
        .process(&buyer, &order.key(), PaymentMethod::Financing, 40000.0, None)
        .await
        .expect_err("decline");
    assert!(matches!(err, AppError::PaymentDeclined(_)));

    let reloaded = env.orders.get(&buyer, &order.key()).await.expect("reload");
    assert_eq!(reloaded.status, OrderStatus::Pending);
    assert_eq!(reloaded.payment.status, PaymentState::Pending);

    // The failed attempt is still in the ledger
    let entries = TransactionRepository::new(env.db.clone())
        .find_by_order(&order.key())
        .await
        .expect("ledger");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, TransactionStatus::Failed);
    assert_eq!(entries[0].kind, TransactionKind::Payment);
    assert!(entries[0].details.is_none());
}

#[tokio::test]
async fn test_wrong_amount_rejected() {
    let env = env().await;
    let vehicle = seed_vehicle(&env, "VIN0006", 15000.0).await;
    let buyer = customer("fred");

    let order = env
        .orders
        .create(&buyer, order_req(&vehicle.key()))
        .await
        .expect("create");

    let err = env
        .payments
        .process(&buyer, &order.key(), PaymentMethod::Cash, 14999.0, None)
        .await
        .expect_err("wrong amount");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_refund_requires_completed_order() {
    let env = env().await;
    let vehicle = seed_vehicle(&env, "VIN0007", 22000.0).await;
    let buyer = customer("gina");

    let order = env
        .orders
        .create(&buyer, order_req(&vehicle.key()))
        .await
        .expect("create");

    let err = env
        .payments
        .refund(&admin(), &order.key(), "TXN-0000-0000", "buyer remorse")
        .await
        .expect_err("refund on pending order");
    assert!(matches!(err, AppError::BusinessRule(_)));

    let entries = TransactionRepository::new(env.db.clone())
        .find_by_order(&order.key())
        .await
        .expect("ledger");
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_refund_rejects_failed_original_transaction() {
    let env = env().await;
    let vehicle = seed_vehicle(&env, "VIN0012", 26000.0).await;
    let buyer = customer("nora");
    let admin = admin();

    let order = env
        .orders
        .create(&buyer, order_req(&vehicle.key()))
        .await
        .expect("create");

    // Journal a failed attempt first, then settle with a working gateway
    let declining =
        PaymentService::new(env.db.clone(), Arc::new(SimulatedGateway::always_decline()));
    let err = declining
        .process(&buyer, &order.key(), PaymentMethod::BankTransfer, 26000.0, None)
        .await
        .expect_err("decline");
    assert!(matches!(err, AppError::PaymentDeclined(_)));

    env.payments
        .process(&buyer, &order.key(), PaymentMethod::BankTransfer, 26000.0, None)
        .await
        .expect("pay");
    env.orders
        .update_status(&admin, &order.key(), OrderStatus::Confirmed, None)
        .await
        .expect("confirm");
    env.orders
        .update_status(&admin, &order.key(), OrderStatus::Completed, None)
        .await
        .expect("complete");

    let ledger = TransactionRepository::new(env.db.clone());
    let entries = ledger.find_by_order(&order.key()).await.expect("ledger");
    assert_eq!(entries.len(), 2);
    let failed = entries
        .iter()
        .find(|e| e.status == TransactionStatus::Failed)
        .expect("failed attempt journaled");

    // Refund pointing at the failed attempt instead of the settled payment
    let err = env
        .payments
        .refund(&admin, &order.key(), &failed.number, "buyer remorse")
        .await
        .expect_err("refund of failed transaction");
    assert!(matches!(err, AppError::BusinessRule(_)));

    let entries = ledger.find_by_order(&order.key()).await.expect("ledger");
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.kind == TransactionKind::Payment));

    let reloaded = env.orders.get(&admin, &order.key()).await.expect("reload");
    assert_eq!(reloaded.status, OrderStatus::Completed);
    assert_eq!(reloaded.payment.status, PaymentState::Paid);
}

#[tokio::test]
async fn test_refund_rejects_transaction_from_another_order() {
    let env = env().await;
    let admin = admin();
    let vehicle_a = seed_vehicle(&env, "VIN0013", 23000.0).await;
    let vehicle_b = seed_vehicle(&env, "VIN0014", 17000.0).await;
    let buyer = customer("olga");

    let order_a = env
        .orders
        .create(&buyer, order_req(&vehicle_a.key()))
        .await
        .expect("create a");
    let order_b = env
        .orders
        .create(&buyer, order_req(&vehicle_b.key()))
        .await
        .expect("create b");

    env.payments
        .process(&buyer, &order_a.key(), PaymentMethod::Cash, 23000.0, None)
        .await
        .expect("pay a");
    let payment_b = env
        .payments
        .process(&buyer, &order_b.key(), PaymentMethod::Cash, 17000.0, None)
        .await
        .expect("pay b");

    env.orders
        .update_status(&admin, &order_a.key(), OrderStatus::Confirmed, None)
        .await
        .expect("confirm a");
    env.orders
        .update_status(&admin, &order_a.key(), OrderStatus::Completed, None)
        .await
        .expect("complete a");

    // Completed order, but the referenced payment settled a different order
    let err = env
        .payments
        .refund(&admin, &order_a.key(), &payment_b.transaction_number, "mix-up")
        .await
        .expect_err("cross-order refund");
    assert!(matches!(err, AppError::BusinessRule(_)));

    let entries = TransactionRepository::new(env.db.clone())
        .find_by_order(&order_a.key())
        .await
        .expect("ledger");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, TransactionKind::Payment);
}

#[tokio::test]
async fn test_full_refund_flow_restocks_vehicle() {
    let env = env().await;
    let vehicle = seed_vehicle(&env, "VIN0008", 27500.0).await;
    let buyer = customer("hank");
    let admin = admin();

    let order = env
        .orders
        .create(&buyer, order_req(&vehicle.key()))
        .await
        .expect("create");
    let payment = env
        .payments
        .process(&buyer, &order.key(), PaymentMethod::BankTransfer, 27500.0, None)
        .await
        .expect("pay");
    env.orders
        .update_status(&admin, &order.key(), OrderStatus::Confirmed, None)
        .await
        .expect("confirm");
    env.orders
        .update_status(&admin, &order.key(), OrderStatus::Completed, None)
        .await
        .expect("complete");

    let refund = env
        .payments
        .refund(&admin, &order.key(), &payment.transaction_number, "defect on delivery")
        .await
        .expect("refund");
    assert_eq!(refund.status, TransactionStatus::Completed);

    let reloaded = env.orders.get(&admin, &order.key()).await.expect("reload");
    assert_eq!(reloaded.status, OrderStatus::Refunded);
    assert_eq!(reloaded.payment.status, PaymentState::Refunded);
    assert_eq!(
        vehicle_status(&env, &vehicle.key()).await,
        AvailabilityStatus::InStock
    );

    let entry = env
        .payments
        .get_by_number(&refund.transaction_number)
        .await
        .expect("refund entry");
    assert_eq!(entry.kind, TransactionKind::Refund);
    assert_eq!(
        entry.refund_of.as_deref(),
        Some(payment.transaction_number.as_str())
    );
    assert_eq!(entry.reason.as_deref(), Some("defect on delivery"));
    assert_eq!(entry.amount, 27500.0);
}

#[tokio::test]
async fn test_illegal_transition_rejected() {
    let env = env().await;
    let vehicle = seed_vehicle(&env, "VIN0009", 12000.0).await;
    let buyer = customer("iris");

    let order = env
        .orders
        .create(&buyer, order_req(&vehicle.key()))
        .await
        .expect("create");

    // pending -> completed skips the intermediate states
    let err = env
        .orders
        .update_status(&admin(), &order.key(), OrderStatus::Completed, None)
        .await
        .expect_err("illegal transition");
    assert!(matches!(err, AppError::BusinessRule(_)));
}

#[tokio::test]
async fn test_cancel_returns_vehicle_to_stock() {
    let env = env().await;
    let vehicle = seed_vehicle(&env, "VIN0010", 21000.0).await;
    let buyer = customer("jack");

    let order = env
        .orders
        .create(&buyer, order_req(&vehicle.key()))
        .await
        .expect("create");
    let cancelled = env.orders.cancel(&buyer, &order.key()).await.expect("cancel");

    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(
        vehicle_status(&env, &vehicle.key()).await,
        AvailabilityStatus::InStock
    );
}

#[tokio::test]
async fn test_stranger_cannot_read_or_cancel_order() {
    let env = env().await;
    let vehicle = seed_vehicle(&env, "VIN0011", 19000.0).await;
    let buyer = customer("kate");
    let stranger = customer("leo");

    let order = env
        .orders
        .create(&buyer, order_req(&vehicle.key()))
        .await
        .expect("create");

    let err = env.orders.get(&stranger, &order.key()).await.expect_err("read");
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = env
        .orders
        .cancel(&stranger, &order.key())
        .await
        .expect_err("cancel");
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_order_numbers_unique_sequential() {
    let env = env().await;
    let mut numbers = HashSet::new();

    for i in 0..10 {
        let vehicle = seed_vehicle(&env, &format!("SEQVIN{i:03}"), 10000.0).await;
        let order = env
            .orders
            .create(&customer("mia"), order_req(&vehicle.key()))
            .await
            .expect("create");
        assert!(numbers.insert(order.number.clone()), "duplicate {}", order.number);
    }
}

#[tokio::test]
async fn test_order_numbers_unique_concurrent() {
    let env = env().await;

    let mut keys = Vec::new();
    for i in 0..8 {
        let vehicle = seed_vehicle(&env, &format!("CONVIN{i:03}"), 10000.0).await;
        keys.push(vehicle.key());
    }

    let mut handles = Vec::new();
    for (i, key) in keys.into_iter().enumerate() {
        let orders = env.orders.clone();
        handles.push(tokio::spawn(async move {
            orders
                .create(&customer(&format!("user{i}")), order_req(&key))
                .await
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        // Embedded engine may abort some racing transactions; every order
        // that did land must carry a distinct number.
        if let Ok(Ok(order)) = handle.await {
            assert!(numbers.insert(order.number.clone()), "duplicate {}", order.number);
        }
    }
    assert!(!numbers.is_empty());
}

#[tokio::test]
async fn test_concurrent_orders_on_same_vehicle() {
    let env = env().await;
    let vehicle = seed_vehicle(&env, "RACEVIN1", 30000.0).await;

    let mut handles = Vec::new();
    for i in 0..6 {
        let orders = env.orders.clone();
        let key = vehicle.key();
        handles.push(tokio::spawn(async move {
            orders
                .create(&customer(&format!("racer{i}")), order_req(&key))
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if matches!(handle.await, Ok(Ok(_))) {
            successes += 1;
        }
    }
    assert!(successes <= 1, "vehicle was double-sold: {successes}");

    let (_, total) = env.orders.list(10, 0).await.expect("list");
    assert_eq!(total, successes);
}
