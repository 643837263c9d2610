use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::SettlementOutcome;

/// Emitted once per payment when its outcome is final.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentSettled {
    pub payment_id: String,
    pub booking_id: String,
    pub outcome: SettlementOutcome,
    pub transaction_id: Option<String>,
    pub settled_at: NaiveDateTime,
}
