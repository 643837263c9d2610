use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    pub amount: Decimal,
    pub service_fee: Decimal,
    /// Fee percentage in force when the payment was initiated.
    pub fee_percentage: Decimal,
    pub status: PaymentStatus,
    pub mpesa_number: String,
    pub transaction_id: Option<String>,
    /// Gateway checkout reference, set once the gateway accepts the request.
    pub checkout_request_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Payment {
    pub fn total_payable(&self) -> Decimal {
        self.amount + self.service_fee
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final result reported for a pending payment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SettlementOutcome {
    Completed,
    Failed,
}

impl From<SettlementOutcome> for PaymentStatus {
    fn from(outcome: SettlementOutcome) -> Self {
        match outcome {
            SettlementOutcome::Completed => PaymentStatus::Completed,
            SettlementOutcome::Failed => PaymentStatus::Failed,
        }
    }
}
