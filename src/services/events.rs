use crate::errors::AppError;
use crate::models::PaymentSettled;
use crate::services::bookings::now;
use crate::services::lifecycle::apply_payment_settled;
use crate::state::AppState;
use crate::store::Store;

/// Lifecycle side of the settlement contract: completes the paid booking.
/// Runs under the same store guard that settled the payment.
pub fn handle_payment_settled(store: &mut Store, event: &PaymentSettled) -> Result<bool, AppError> {
    let booking = store
        .booking_mut(&event.booking_id)
        .ok_or_else(|| AppError::NotFound(format!("booking {}", event.booking_id)))?;

    let changed = apply_payment_settled(booking, event, now())?;
    if !changed {
        tracing::debug!(
            booking_id = %event.booking_id,
            payment_id = %event.payment_id,
            outcome = ?event.outcome,
            "settlement left booking unchanged"
        );
    }
    Ok(changed)
}

/// Hands a settlement to live subscribers.
pub fn broadcast_settlement(state: &AppState, event: PaymentSettled) {
    // No receivers is fine
    let _ = state.events_tx.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, Booking, BookingStatus, SettlementOutcome};
    use crate::services::lifecycle::{self, NewBooking};
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn confirmed_booking() -> Booking {
        let request = NewBooking {
            service_id: "svc-1".to_string(),
            business_id: "biz-1".to_string(),
            date: NaiveDate::from_ymd_opt(2099, 6, 15).unwrap(),
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
            total_amount: Decimal::from(1500),
            notes: None,
        };
        let mut booking =
            lifecycle::create_booking("cust-1", request, &[], dt("2099-06-01 09:00")).unwrap();
        lifecycle::confirm(&mut booking, Actor::Business, dt("2099-06-01 10:00")).unwrap();
        booking
    }

    fn event(booking_id: &str, outcome: SettlementOutcome) -> PaymentSettled {
        PaymentSettled {
            payment_id: "pay-1".to_string(),
            booking_id: booking_id.to_string(),
            outcome,
            transaction_id: None,
            settled_at: dt("2099-06-02 09:00"),
        }
    }

    #[test]
    fn test_completed_settlement_completes_booking() {
        let mut store = Store::default();
        let booking = confirmed_booking();
        let id = booking.id.clone();
        store.insert_booking(booking);

        let changed =
            handle_payment_settled(&mut store, &event(&id, SettlementOutcome::Completed)).unwrap();
        assert!(changed);
        assert_eq!(store.booking(&id).unwrap().status, BookingStatus::Completed);
    }

    #[test]
    fn test_cancelled_booking_is_left_alone() {
        let mut store = Store::default();
        let mut booking = confirmed_booking();
        lifecycle::cancel(&mut booking, Actor::Customer, dt("2099-06-01 11:00")).unwrap();
        let id = booking.id.clone();
        store.insert_booking(booking);

        let changed =
            handle_payment_settled(&mut store, &event(&id, SettlementOutcome::Completed)).unwrap();
        assert!(!changed);
        assert_eq!(store.booking(&id).unwrap().status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_unknown_booking_is_not_found() {
        let mut store = Store::default();
        assert!(matches!(
            handle_payment_settled(&mut store, &event("missing", SettlementOutcome::Completed)),
            Err(AppError::NotFound(_))
        ));
    }
}
