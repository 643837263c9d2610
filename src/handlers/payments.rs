use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Payment, SettlementOutcome};
use crate::services::fees::{self, FeeQuote};
use crate::services::{bookings, payments};
use crate::state::AppState;

use super::{check_admin, session_from_headers};

// GET /api/fees/quote
#[derive(Deserialize)]
pub struct QuoteQuery {
    pub amount: Decimal,
}

pub async fn fee_quote(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<FeeQuote>, AppError> {
    let config = state.mpesa_config()?;
    Ok(Json(fees::quote(query.amount, &config)?))
}

// POST /api/bookings/:id/payments
#[derive(Deserialize)]
pub struct PayRequest {
    pub mpesa_number: String,
}

#[derive(Serialize)]
pub struct PaymentResponse {
    #[serde(flatten)]
    payment: Payment,
    total_payable: Decimal,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        let total_payable = payment.total_payable();
        Self {
            payment,
            total_payable,
        }
    }
}

pub async fn start_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(booking_id): Path<String>,
    Json(body): Json<PayRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    let session = session_from_headers(&headers)?;
    let payment = payments::start_payment(&state, &session, &booking_id, &body.mpesa_number).await?;
    Ok((StatusCode::ACCEPTED, Json(payment.into())))
}

// GET /api/payments/:id
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PaymentResponse>, AppError> {
    let session = session_from_headers(&headers)?;
    let payment = payments::get(&state, &id)?;
    let booking = bookings::get(&state, &payment.booking_id)?;
    bookings::ensure_party(&session, &booking)?;
    Ok(Json(payment.into()))
}

// POST /api/payments/:id/callback
#[derive(Deserialize)]
pub struct CallbackRequest {
    pub outcome: SettlementOutcome,
    pub transaction_id: Option<String>,
}

/// Result notification from the payment gateway. The gateway authenticates
/// with the same bearer token as the admin API.
pub async fn payment_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<CallbackRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    check_admin(&headers, &state.config.admin_token)?;

    tracing::info!(payment_id = %id, outcome = ?body.outcome, "gateway callback received");
    let payment = payments::record_settlement(&state, &id, body.outcome, body.transaction_id)?;
    Ok(Json(payment.into()))
}
