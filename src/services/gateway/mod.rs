pub mod simulated;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifiers returned when the gateway accepts a payment prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayRequest {
    pub merchant_request_id: String,
    pub checkout_request_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GatewayStatus {
    Pending,
    Completed,
    Failed,
}

/// Mobile-money rail used to collect booking payments.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(
        &self,
        phone_number: &str,
        amount: Decimal,
        reference: &str,
    ) -> anyhow::Result<GatewayRequest>;

    async fn poll_status(&self, checkout_request_id: &str) -> anyhow::Result<GatewayStatus>;
}
