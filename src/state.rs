use std::sync::{Mutex, MutexGuard, RwLock};

use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{MpesaConfig, PaymentSettled};
use crate::services::gateway::PaymentGateway;
use crate::store::Store;

pub struct AppState {
    pub store: Mutex<Store>,
    pub config: AppConfig,
    pub mpesa: RwLock<MpesaConfig>,
    pub gateway: Box<dyn PaymentGateway>,
    pub events_tx: broadcast::Sender<PaymentSettled>,
}

impl AppState {
    pub fn new(config: AppConfig, mpesa: MpesaConfig, gateway: Box<dyn PaymentGateway>) -> Self {
        let (events_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            store: Mutex::new(Store::default()),
            config,
            mpesa: RwLock::new(mpesa),
            gateway,
            events_tx,
        }
    }

    pub fn store(&self) -> Result<MutexGuard<'_, Store>, AppError> {
        self.store
            .lock()
            .map_err(|_| AppError::Internal("store lock poisoned".to_string()))
    }

    /// Snapshot of the current M-Pesa settings.
    pub fn mpesa_config(&self) -> Result<MpesaConfig, AppError> {
        self.mpesa
            .read()
            .map(|c| c.clone())
            .map_err(|_| AppError::Internal("config lock poisoned".to_string()))
    }

    pub fn set_mpesa_config(&self, config: MpesaConfig) -> Result<(), AppError> {
        let mut current = self
            .mpesa
            .write()
            .map_err(|_| AppError::Internal("config lock poisoned".to_string()))?;
        *current = config;
        Ok(())
    }
}
