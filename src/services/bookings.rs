use chrono::{Local, NaiveDateTime};

use crate::errors::{AppError, CoreError};
use crate::models::{Booking, BookingStatus, Role, Session};
use crate::services::lifecycle::{self, NewBooking};
use crate::state::AppState;

/// Local wall-clock time, comparable with booking dates and `HH:MM` slots.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn create(state: &AppState, session: &Session, request: NewBooking) -> Result<Booking, AppError> {
    if session.role != Role::Customer {
        return Err(not_permitted(session, "request a booking"));
    }

    let mut store = state.store()?;
    let booking = lifecycle::create_booking(&session.user_id, request, store.bookings(), now())?;
    store.insert_booking(booking.clone());

    tracing::info!(
        booking_id = %booking.id,
        business_id = %booking.business_id,
        date = %booking.date,
        start = %booking.start_time,
        "booking requested"
    );
    Ok(booking)
}

pub fn get(state: &AppState, id: &str) -> Result<Booking, AppError> {
    state
        .store()?
        .booking(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

pub fn change_status(
    state: &AppState,
    session: &Session,
    id: &str,
    to: BookingStatus,
) -> Result<Booking, AppError> {
    let mut store = state.store()?;
    let booking = store
        .booking_mut(id)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    ensure_party(session, booking)?;
    lifecycle::transition(booking, to, session.actor(), now())?;
    Ok(booking.clone())
}

pub fn set_notes(
    state: &AppState,
    session: &Session,
    id: &str,
    notes: Option<String>,
) -> Result<Booking, AppError> {
    let mut store = state.store()?;
    let booking = store
        .booking_mut(id)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))?;

    ensure_party(session, booking)?;
    lifecycle::update_notes(booking, notes, now());
    Ok(booking.clone())
}

/// Only the booking's customer, its business, or an admin may touch it.
pub fn ensure_party(session: &Session, booking: &Booking) -> Result<(), AppError> {
    let allowed = match session.role {
        Role::Admin => true,
        Role::Business => session.user_id == booking.business_id,
        Role::Customer => session.user_id == booking.customer_id,
    };
    if allowed {
        Ok(())
    } else {
        Err(not_permitted(session, "act on this booking"))
    }
}

fn not_permitted(session: &Session, action: &str) -> AppError {
    CoreError::NotPermitted {
        actor: format!("{} {}", session.actor(), session.user_id),
        action: action.to_string(),
    }
    .into()
}
