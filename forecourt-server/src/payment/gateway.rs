//! Payment gateway capability
//!
//! The order/payment logic only sees this trait. The simulated gateway is
//! the production default until a real acquirer integration lands; tests
//! inject their own implementations to force declines deterministically.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::{PaymentMethod, TransactionDetails};

/// Charge request handed to the gateway
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub order_number: String,
    pub amount: f64,
    pub currency: String,
    pub method: PaymentMethod,
}

/// Refund request handed to the gateway
#[derive(Debug, Clone)]
pub struct RefundRequest {
    pub order_number: String,
    pub amount: f64,
    pub currency: String,
    pub method: PaymentMethod,
    /// Gateway reference of the original charge
    pub original_reference: String,
}

/// Successful gateway outcome
#[derive(Debug, Clone)]
pub struct GatewayReceipt {
    pub reference: String,
    pub details: TransactionDetails,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Business decline (insufficient funds, limits...). Not a system fault.
    #[error("declined: {0}")]
    Declined(String),

    /// The gateway could not be reached or answered garbage
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn capture(&self, req: &ChargeRequest) -> Result<GatewayReceipt, GatewayError>;
    async fn refund(&self, req: &RefundRequest) -> Result<GatewayReceipt, GatewayError>;
}

/// Simulated gateway: configurable latency and decline rate.
///
/// 不把随机数埋进业务逻辑——失败率在这里、也只在这里。
pub struct SimulatedGateway {
    latency: Duration,
    decline_rate: f64,
}

impl SimulatedGateway {
    pub fn new(latency: Duration, decline_rate: f64) -> Self {
        Self {
            latency,
            decline_rate: decline_rate.clamp(0.0, 1.0),
        }
    }

    /// Zero latency, never declines (tests, local development)
    pub fn always_approve() -> Self {
        Self::new(Duration::ZERO, 0.0)
    }

    /// Zero latency, always declines (tests)
    pub fn always_decline() -> Self {
        Self::new(Duration::ZERO, 1.0)
    }

    fn rolls_decline(&self) -> bool {
        if self.decline_rate <= 0.0 {
            return false;
        }
        if self.decline_rate >= 1.0 {
            return true;
        }
        rand::thread_rng().gen_range(0.0..1.0) < self.decline_rate
    }

    fn receipt_for(method: PaymentMethod) -> GatewayReceipt {
        let token = Uuid::new_v4().simple().to_string();
        match method {
            PaymentMethod::BankTransfer => GatewayReceipt {
                reference: format!("BT-{token}"),
                details: TransactionDetails::BankTransfer {
                    reference: format!("BT-{token}"),
                },
            },
            PaymentMethod::Cash => GatewayReceipt {
                reference: format!("RCPT-{token}"),
                details: TransactionDetails::Cash {
                    receipt_number: format!("RCPT-{token}"),
                },
            },
            PaymentMethod::Financing => GatewayReceipt {
                reference: format!("LN-{token}"),
                details: TransactionDetails::Financing {
                    loan_reference: format!("LN-{token}"),
                },
            },
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn capture(&self, req: &ChargeRequest) -> Result<GatewayReceipt, GatewayError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.rolls_decline() {
            tracing::warn!(order = %req.order_number, "Simulated gateway declined charge");
            return Err(GatewayError::Declined(
                "Charge declined by issuer".to_string(),
            ));
        }
        Ok(Self::receipt_for(req.method))
    }

    async fn refund(&self, req: &RefundRequest) -> Result<GatewayReceipt, GatewayError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        // Refunds of captured charges do not get declined by the simulator
        let token = Uuid::new_v4().simple().to_string();
        Ok(GatewayReceipt {
            reference: format!("RF-{token}"),
            details: match req.method {
                PaymentMethod::BankTransfer => TransactionDetails::BankTransfer {
                    reference: format!("RF-{token}"),
                },
                PaymentMethod::Cash => TransactionDetails::Cash {
                    receipt_number: format!("RF-{token}"),
                },
                PaymentMethod::Financing => TransactionDetails::Financing {
                    loan_reference: format!("RF-{token}"),
                },
            },
        })
    }
}
