use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::time::Instant;

use super::{GatewayRequest, GatewayStatus, PaymentGateway};

/// Accepts every prompt and reports it completed once `confirm_after` has
/// elapsed, standing in for the customer approving on their handset.
pub struct SimulatedGateway {
    confirm_after: Duration,
    requests: Mutex<HashMap<String, Instant>>,
}

impl SimulatedGateway {
    pub fn new(confirm_after: Duration) -> Self {
        Self {
            confirm_after,
            requests: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn initiate(
        &self,
        phone_number: &str,
        amount: Decimal,
        reference: &str,
    ) -> anyhow::Result<GatewayRequest> {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let request = GatewayRequest {
            merchant_request_id: format!("M{suffix}"),
            checkout_request_id: format!("C{suffix}"),
        };

        self.requests
            .lock()
            .map_err(|_| anyhow::anyhow!("simulated gateway state poisoned"))?
            .insert(request.checkout_request_id.clone(), Instant::now());

        tracing::info!(
            phone = %phone_number,
            %amount,
            reference = %reference,
            checkout_request_id = %request.checkout_request_id,
            "simulated payment prompt sent"
        );
        Ok(request)
    }

    async fn poll_status(&self, checkout_request_id: &str) -> anyhow::Result<GatewayStatus> {
        let mut requests = self
            .requests
            .lock()
            .map_err(|_| anyhow::anyhow!("simulated gateway state poisoned"))?;
        let started = requests
            .get(checkout_request_id)
            .ok_or_else(|| anyhow::anyhow!("unknown checkout request: {checkout_request_id}"))?;

        if started.elapsed() < self.confirm_after {
            return Ok(GatewayStatus::Pending);
        }
        // Completed is final; forget the request
        requests.remove(checkout_request_id);
        Ok(GatewayStatus::Completed)
    }
}
