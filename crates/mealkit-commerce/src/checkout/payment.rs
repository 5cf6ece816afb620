//! Payment gateway seam.
//!
//! The core ships a simulated gateway only: it waits a fixed latency and
//! always succeeds. A real integration implements [`PaymentGateway`].

use crate::ids::{CheckoutId, LineId};
use crate::money::Money;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default simulated gateway latency.
pub const DEFAULT_PAYMENT_LATENCY: Duration = Duration::from_millis(1200);

/// What the checkout asks the gateway to charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub checkout_id: CheckoutId,
    pub amount: Money,
    pub customer_email: String,
    pub lines: Vec<LineId>,
}

/// Proof of a completed charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Gateway reference for the charge.
    pub reference: String,
    pub amount: Money,
    /// Gateway that processed the charge.
    pub gateway: String,
}

/// A payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Gateway name for receipts and logs.
    fn name(&self) -> &str;

    /// Charge the request. Must be cancel-safe: dropping the future before it
    /// completes must not leave a charge behind.
    async fn charge(&self, request: &PaymentRequest) -> PaymentReceipt;
}

/// Stand-in gateway with a fixed delay and no failure path.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    latency: Duration,
}

impl SimulatedGateway {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(DEFAULT_PAYMENT_LATENCY)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn charge(&self, request: &PaymentRequest) -> PaymentReceipt {
        tracing::debug!(
            checkout_id = %request.checkout_id,
            amount = %request.amount,
            latency_ms = self.latency.as_millis() as u64,
            "simulating payment"
        );
        tokio::time::sleep(self.latency).await;
        PaymentReceipt {
            reference: format!("sim_{}", uuid::Uuid::new_v4().simple()),
            amount: request.amount,
            gateway: self.name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[tokio::test(start_paused = true)]
    async fn test_simulated_charge_waits_latency() {
        let gateway = SimulatedGateway::new(Duration::from_millis(1200));
        let request = PaymentRequest {
            checkout_id: CheckoutId::new("chk_1"),
            amount: Money::new(2598, Currency::AUD),
            customer_email: "a@b.com".to_string(),
            lines: vec![],
        };

        let start = tokio::time::Instant::now();
        let receipt = gateway.charge(&request).await;

        assert!(start.elapsed() >= Duration::from_millis(1200));
        assert_eq!(receipt.amount, request.amount);
        assert_eq!(receipt.gateway, "simulated");
        assert!(receipt.reference.starts_with("sim_"));
    }
}
