use std::env;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::MpesaConfig;
use crate::services::slots::WeekStart;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub admin_token: String,
    pub service_fee_percentage: Decimal,
    pub admin_mpesa_number: String,
    pub week_start: WeekStart,
    pub gateway_confirm_delay_ms: u64,
    pub payment_poll_interval_ms: u64,
    pub payment_timeout_secs: u64,
    pub event_channel_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_env("PORT", 3000),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            service_fee_percentage: parse_env("SERVICE_FEE_PERCENTAGE", Decimal::from(5)),
            admin_mpesa_number: env::var("ADMIN_MPESA_NUMBER").unwrap_or_default(),
            week_start: env::var("WEEK_STARTS_ON")
                .ok()
                .and_then(|v| WeekStart::parse(&v))
                .unwrap_or_default(),
            gateway_confirm_delay_ms: parse_env("GATEWAY_CONFIRM_DELAY_MS", 3000),
            payment_poll_interval_ms: parse_env("PAYMENT_POLL_INTERVAL_MS", 1000),
            payment_timeout_secs: parse_env("PAYMENT_TIMEOUT_SECS", 60),
            event_channel_capacity: parse_env("EVENT_CHANNEL_CAPACITY", 256),
        }
    }

    /// Starting M-Pesa settings; the admin may change them at runtime.
    pub fn initial_mpesa_config(&self) -> Result<MpesaConfig, CoreError> {
        MpesaConfig {
            service_fee_percentage: self.service_fee_percentage,
            admin_mpesa_number: self.admin_mpesa_number.clone(),
        }
        .validate()
    }

    pub fn gateway_confirm_delay(&self) -> Duration {
        Duration::from_millis(self.gateway_confirm_delay_ms)
    }

    pub fn payment_poll_interval(&self) -> Duration {
        Duration::from_millis(self.payment_poll_interval_ms.max(1))
    }

    pub fn payment_timeout(&self) -> Duration {
        Duration::from_secs(self.payment_timeout_secs)
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
