use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::services::phone::normalize_phone;

/// Platform-wide M-Pesa settings managed by the admin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MpesaConfig {
    pub service_fee_percentage: Decimal,
    /// Destination for collected fees; empty until the admin sets it.
    pub admin_mpesa_number: String,
}

impl Default for MpesaConfig {
    fn default() -> Self {
        Self {
            service_fee_percentage: Decimal::from(5),
            admin_mpesa_number: String::new(),
        }
    }
}

impl MpesaConfig {
    /// Checks the fee range and normalizes the admin number in place.
    pub fn validate(mut self) -> Result<Self, CoreError> {
        if self.service_fee_percentage < Decimal::ZERO
            || self.service_fee_percentage > Decimal::ONE_HUNDRED
        {
            return Err(CoreError::InvalidArgument(format!(
                "service fee percentage must be between 0 and 100, got {}",
                self.service_fee_percentage
            )));
        }
        if !self.admin_mpesa_number.trim().is_empty() {
            self.admin_mpesa_number = normalize_phone(&self.admin_mpesa_number)?;
        }
        Ok(self)
    }
}
