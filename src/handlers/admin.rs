use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, CoreError};
use crate::models::{MpesaConfig, Payment, PaymentStatus};
use crate::services::transactions::{
    export_csv, filter_transactions, summarize, TransactionFilter, TransactionSummary,
};
use crate::state::AppState;

use super::check_admin;

// GET /api/admin/settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MpesaConfig>, AppError> {
    check_admin(&headers, &state.config.admin_token)?;
    Ok(Json(state.mpesa_config()?))
}

// POST /api/admin/settings
#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    pub service_fee_percentage: Option<rust_decimal::Decimal>,
    pub admin_mpesa_number: Option<String>,
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<Json<MpesaConfig>, AppError> {
    check_admin(&headers, &state.config.admin_token)?;

    let mut config = state.mpesa_config()?;
    if let Some(pct) = body.service_fee_percentage {
        config.service_fee_percentage = pct;
    }
    if let Some(number) = body.admin_mpesa_number {
        config.admin_mpesa_number = number;
    }

    let config = config.validate()?;
    state.set_mpesa_config(config.clone())?;

    tracing::info!(
        service_fee_percentage = %config.service_fee_percentage,
        admin_mpesa_number = %config.admin_mpesa_number,
        "mpesa settings updated"
    );
    Ok(Json(config))
}

// GET /api/admin/transactions
#[derive(Deserialize)]
pub struct TransactionsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl TransactionsQuery {
    fn into_filter(self) -> Result<TransactionFilter, CoreError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some("pending") => Some(PaymentStatus::Pending),
            Some("completed") => Some(PaymentStatus::Completed),
            Some("failed") => Some(PaymentStatus::Failed),
            Some(other) => {
                return Err(CoreError::InvalidArgument(format!("unknown status {other:?}")))
            }
        };
        Ok(TransactionFilter {
            search: self.search,
            status,
            start: self.start,
            end: self.end,
        })
    }
}

#[derive(Serialize)]
pub struct TransactionsResponse {
    transactions: Vec<Payment>,
    summary: TransactionSummary,
}

pub async fn get_transactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TransactionsQuery>,
) -> Result<Json<TransactionsResponse>, AppError> {
    check_admin(&headers, &state.config.admin_token)?;
    let filter = query.into_filter()?;

    let response = {
        let store = state.store()?;
        let mut matched = filter_transactions(store.payments(), &filter);
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        TransactionsResponse {
            summary: summarize(&matched),
            transactions: matched.into_iter().cloned().collect(),
        }
    };
    Ok(Json(response))
}

// GET /api/admin/transactions/export.csv
pub async fn export_transactions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<TransactionsQuery>,
) -> Result<impl IntoResponse, AppError> {
    check_admin(&headers, &state.config.admin_token)?;
    let filter = query.into_filter()?;

    let csv = {
        let store = state.store()?;
        let mut matched = filter_transactions(store.payments(), &filter);
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        export_csv(&matched).map_err(|e| AppError::Internal(e.to_string()))?
    };

    let filename = format!(
        "attachment; filename=\"transactions-{}.csv\"",
        crate::services::bookings::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    ))
}
