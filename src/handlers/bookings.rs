use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, Role, Session};
use crate::services::bookings;
use crate::services::lifecycle::NewBooking;
use crate::services::slots::{bookings_for_date, week_grid};
use crate::state::AppState;

use super::session_from_headers;

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<NewBooking>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let session = session_from_headers(&headers)?;
    let booking = bookings::create(&state, &session, body)?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub business_id: Option<String>,
    pub date: Option<NaiveDate>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let session = session_from_headers(&headers)?;
    let visible = visible_bookings(&state, &session, query.business_id.as_deref())?;

    let bookings = match query.date {
        Some(date) => bookings_for_date(&visible, date)?
            .into_iter()
            .cloned()
            .collect(),
        None => visible,
    };
    Ok(Json(bookings))
}

// GET /api/bookings/week
#[derive(Deserialize)]
pub struct WeekQuery {
    pub anchor: Option<NaiveDate>,
    pub business_id: Option<String>,
}

pub async fn week_view(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<WeekQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = session_from_headers(&headers)?;
    let visible = visible_bookings(&state, &session, query.business_id.as_deref())?;

    let anchor = query.anchor.unwrap_or_else(|| bookings::now().date());
    let grid = week_grid(&visible, anchor, state.config.week_start)?;
    let body = serde_json::to_value(&grid).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(body))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let session = session_from_headers(&headers)?;
    let booking = bookings::get(&state, &id)?;
    bookings::ensure_party(&session, &booking)?;
    Ok(Json(booking))
}

// POST /api/bookings/:id/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    change_status(&state, &headers, &id, BookingStatus::Confirmed)
}

// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    change_status(&state, &headers, &id, BookingStatus::Cancelled)
}

// POST /api/bookings/:id/complete
pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    change_status(&state, &headers, &id, BookingStatus::Completed)
}

// PATCH /api/bookings/:id/notes
#[derive(Deserialize)]
pub struct NotesRequest {
    pub notes: Option<String>,
}

pub async fn update_notes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<NotesRequest>,
) -> Result<Json<Booking>, AppError> {
    let session = session_from_headers(&headers)?;
    let booking = bookings::set_notes(&state, &session, &id, body.notes)?;
    Ok(Json(booking))
}

fn change_status(
    state: &AppState,
    headers: &HeaderMap,
    id: &str,
    to: BookingStatus,
) -> Result<Json<Booking>, AppError> {
    let session = session_from_headers(headers)?;
    let booking = bookings::change_status(state, &session, id, to)?;
    Ok(Json(booking))
}

/// Customers see their own bookings, businesses their own calendar, admins
/// everything. `business_id` narrows the result further.
fn visible_bookings(
    state: &AppState,
    session: &Session,
    business_id: Option<&str>,
) -> Result<Vec<Booking>, AppError> {
    let store = state.store()?;
    Ok(store
        .bookings()
        .iter()
        .filter(|b| match session.role {
            Role::Admin => true,
            Role::Business => b.business_id == session.user_id,
            Role::Customer => b.customer_id == session.user_id,
        })
        .filter(|b| business_id.map_or(true, |id| b.business_id == id))
        .cloned()
        .collect())
}
