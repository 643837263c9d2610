use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::CoreError;
use crate::models::{
    Actor, Booking, BookingStatus, PaymentSettled, SettlementOutcome, TimeInterval,
};
use crate::services::slots::check_slot_conflict;

#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub service_id: String,
    pub business_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub total_amount: Decimal,
    pub notes: Option<String>,
}

/// Validates a customer's booking request against the existing bookings and
/// returns it as a new `pending` booking.
pub fn create_booking(
    customer_id: &str,
    request: NewBooking,
    existing: &[Booking],
    now: NaiveDateTime,
) -> Result<Booking, CoreError> {
    let interval = TimeInterval::parse(&request.start_time, &request.end_time)?;
    if request.total_amount < Decimal::ZERO {
        return Err(CoreError::InvalidArgument(format!(
            "total amount must be non-negative, got {}",
            request.total_amount
        )));
    }

    check_slot_conflict(&request.business_id, request.date, &interval, existing)?;

    Ok(Booking {
        id: uuid::Uuid::new_v4().to_string(),
        customer_id: customer_id.to_string(),
        service_id: request.service_id,
        business_id: request.business_id,
        date: request.date,
        start_time: request.start_time,
        end_time: request.end_time,
        status: BookingStatus::Pending,
        total_amount: request.total_amount,
        notes: request.notes.filter(|n| !n.trim().is_empty()),
        created_at: now,
        updated_at: now,
    })
}

/// Moves `booking` to `to` if the lifecycle and the acting party allow it.
/// The booking is left untouched on error.
pub fn transition(
    booking: &mut Booking,
    to: BookingStatus,
    actor: Actor,
    now: NaiveDateTime,
) -> Result<(), CoreError> {
    let from = booking.status;
    let invalid = CoreError::InvalidTransition { from, to };

    if from.is_terminal() {
        return Err(invalid);
    }

    match (from, to) {
        (BookingStatus::Pending, BookingStatus::Confirmed) => {
            require_actor(actor, &[Actor::Business], "confirm a booking")?;
            if booking.starts_at()? < now {
                return Err(CoreError::GuardRejected {
                    from,
                    to,
                    reason: "booking start is in the past".to_string(),
                });
            }
        }
        (BookingStatus::Pending | BookingStatus::Confirmed, BookingStatus::Cancelled) => {
            require_actor(actor, &[Actor::Customer, Actor::Business], "cancel a booking")?;
        }
        (BookingStatus::Confirmed, BookingStatus::Completed) => {
            require_actor(actor, &[Actor::Business, Actor::System], "complete a booking")?;
            // Payment settlement may complete early; the business may not.
            if actor == Actor::Business && now < booking.ends_at()? {
                return Err(CoreError::GuardRejected {
                    from,
                    to,
                    reason: "booking has not ended yet".to_string(),
                });
            }
        }
        _ => return Err(invalid),
    }

    booking.status = to;
    booking.updated_at = now;
    tracing::info!(booking_id = %booking.id, %from, %to, %actor, "booking status changed");
    Ok(())
}

pub fn confirm(booking: &mut Booking, actor: Actor, now: NaiveDateTime) -> Result<(), CoreError> {
    transition(booking, BookingStatus::Confirmed, actor, now)
}

pub fn cancel(booking: &mut Booking, actor: Actor, now: NaiveDateTime) -> Result<(), CoreError> {
    transition(booking, BookingStatus::Cancelled, actor, now)
}

pub fn complete(booking: &mut Booking, actor: Actor, now: NaiveDateTime) -> Result<(), CoreError> {
    transition(booking, BookingStatus::Completed, actor, now)
}

pub fn update_notes(booking: &mut Booking, notes: Option<String>, now: NaiveDateTime) {
    booking.notes = notes.filter(|n| !n.trim().is_empty());
    booking.updated_at = now;
}

/// Consumes a settlement event for `booking`. A completed payment completes a
/// confirmed booking; terminal bookings and failed payments are left alone.
/// Returns whether the booking changed.
pub fn apply_payment_settled(
    booking: &mut Booking,
    event: &PaymentSettled,
    now: NaiveDateTime,
) -> Result<bool, CoreError> {
    if event.booking_id != booking.id {
        return Err(CoreError::InvalidArgument(format!(
            "settlement for booking {} applied to booking {}",
            event.booking_id, booking.id
        )));
    }
    if event.outcome != SettlementOutcome::Completed || booking.status.is_terminal() {
        return Ok(false);
    }
    complete(booking, Actor::System, now)?;
    Ok(true)
}

fn require_actor(actor: Actor, allowed: &[Actor], action: &str) -> Result<(), CoreError> {
    if allowed.contains(&actor) {
        Ok(())
    } else {
        Err(CoreError::NotPermitted {
            actor: actor.to_string(),
            action: action.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn request(start: &str, end: &str) -> NewBooking {
        NewBooking {
            service_id: "svc-1".to_string(),
            business_id: "biz-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            total_amount: Decimal::from(1500),
            notes: Some("Beard trim too".to_string()),
        }
    }

    fn pending() -> Booking {
        create_booking("cust-1", request("10:00", "11:00"), &[], dt("2024-03-18 09:00")).unwrap()
    }

    fn confirmed() -> Booking {
        let mut b = pending();
        confirm(&mut b, Actor::Business, dt("2024-03-18 10:00")).unwrap();
        b
    }

    fn settled(booking: &Booking, outcome: SettlementOutcome) -> PaymentSettled {
        PaymentSettled {
            payment_id: "pay-1".to_string(),
            booking_id: booking.id.clone(),
            outcome,
            transaction_id: Some("MPTEST".to_string()),
            settled_at: dt("2024-03-19 12:00"),
        }
    }

    #[test]
    fn test_create_booking_is_pending() {
        let b = pending();
        assert_eq!(b.status, BookingStatus::Pending);
        assert_eq!(b.customer_id, "cust-1");
        assert_eq!(b.created_at, b.updated_at);
        assert!(!b.id.is_empty());
    }

    #[test]
    fn test_create_booking_rejects_bad_input() {
        let now = dt("2024-03-18 09:00");
        assert!(matches!(
            create_booking("c", request("11:00", "10:00"), &[], now),
            Err(CoreError::MalformedTimeSlot(_))
        ));
        let mut negative = request("10:00", "11:00");
        negative.total_amount = Decimal::from(-1);
        assert!(matches!(
            create_booking("c", negative, &[], now),
            Err(CoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_create_booking_rejects_double_booking() {
        let now = dt("2024-03-18 09:00");
        let first = create_booking("c1", request("10:00", "11:00"), &[], now).unwrap();
        let result = create_booking("c2", request("10:30", "11:30"), &[first.clone()], now);
        assert_eq!(
            result,
            Err(CoreError::SlotConflict {
                booking_id: first.id
            })
        );
    }

    #[test]
    fn test_confirm_then_complete() {
        let mut b = confirmed();
        assert_eq!(b.status, BookingStatus::Confirmed);
        assert_eq!(b.updated_at, dt("2024-03-18 10:00"));

        complete(&mut b, Actor::Business, dt("2024-03-20 11:00")).unwrap();
        assert_eq!(b.status, BookingStatus::Completed);
        assert_eq!(b.updated_at, dt("2024-03-20 11:00"));
    }

    #[test]
    fn test_confirm_requires_business() {
        let mut b = pending();
        let result = confirm(&mut b, Actor::Customer, dt("2024-03-18 10:00"));
        assert!(matches!(result, Err(CoreError::NotPermitted { .. })));
        assert_eq!(b.status, BookingStatus::Pending);
    }

    #[test]
    fn test_confirm_past_booking_rejected() {
        let mut b = pending();
        let result = confirm(&mut b, Actor::Business, dt("2024-03-20 10:01"));
        assert!(matches!(result, Err(CoreError::GuardRejected { .. })));
        assert_eq!(b.status, BookingStatus::Pending);
    }

    #[test]
    fn test_business_cannot_complete_before_end() {
        let mut b = confirmed();
        let result = complete(&mut b, Actor::Business, dt("2024-03-20 10:59"));
        assert!(matches!(result, Err(CoreError::GuardRejected { .. })));
        assert_eq!(b.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_pending_cannot_skip_to_completed() {
        let mut b = pending();
        let result = complete(&mut b, Actor::Business, dt("2024-03-21 09:00"));
        assert_eq!(
            result,
            Err(CoreError::InvalidTransition {
                from: BookingStatus::Pending,
                to: BookingStatus::Completed
            })
        );
    }

    #[test]
    fn test_customer_and_business_can_cancel() {
        let mut by_customer = pending();
        cancel(&mut by_customer, Actor::Customer, dt("2024-03-18 11:00")).unwrap();
        assert_eq!(by_customer.status, BookingStatus::Cancelled);

        let mut by_business = confirmed();
        cancel(&mut by_business, Actor::Business, dt("2024-03-18 11:00")).unwrap();
        assert_eq!(by_business.status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let targets = [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ];
        let actors = [Actor::Customer, Actor::Business, Actor::System];

        let mut cancelled = pending();
        cancel(&mut cancelled, Actor::Customer, dt("2024-03-18 11:00")).unwrap();
        let mut completed = confirmed();
        complete(&mut completed, Actor::System, dt("2024-03-19 11:00")).unwrap();

        for terminal in [cancelled, completed] {
            for to in targets {
                for actor in actors {
                    let mut b = terminal.clone();
                    let result = transition(&mut b, to, actor, dt("2024-03-25 09:00"));
                    assert_eq!(
                        result,
                        Err(CoreError::InvalidTransition {
                            from: terminal.status,
                            to
                        })
                    );
                    assert_eq!(b, terminal);
                }
            }
        }
    }

    #[test]
    fn test_update_notes_refreshes_timestamp() {
        let mut b = pending();
        update_notes(&mut b, Some("Bring towels".to_string()), dt("2024-03-18 12:00"));
        assert_eq!(b.notes.as_deref(), Some("Bring towels"));
        assert_eq!(b.updated_at, dt("2024-03-18 12:00"));

        update_notes(&mut b, Some("   ".to_string()), dt("2024-03-18 13:00"));
        assert_eq!(b.notes, None);
    }

    #[test]
    fn test_completed_payment_completes_booking() {
        let mut b = confirmed();
        let event = settled(&b, SettlementOutcome::Completed);
        let changed = apply_payment_settled(&mut b, &event, dt("2024-03-19 12:00")).unwrap();
        assert!(changed);
        assert_eq!(b.status, BookingStatus::Completed);
    }

    #[test]
    fn test_settlement_noop_on_terminal_or_failed() {
        let mut b = confirmed();
        let failed = settled(&b, SettlementOutcome::Failed);
        assert!(!apply_payment_settled(&mut b, &failed, dt("2024-03-19 12:00")).unwrap());
        assert_eq!(b.status, BookingStatus::Confirmed);

        cancel(&mut b, Actor::Customer, dt("2024-03-19 12:30")).unwrap();
        let completed = settled(&b, SettlementOutcome::Completed);
        assert!(!apply_payment_settled(&mut b, &completed, dt("2024-03-19 13:00")).unwrap());
        assert_eq!(b.status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_settlement_for_other_booking_rejected() {
        let mut b = confirmed();
        let mut event = settled(&b, SettlementOutcome::Completed);
        event.booking_id = "someone-else".to_string();
        assert!(matches!(
            apply_payment_settled(&mut b, &event, dt("2024-03-19 12:00")),
            Err(CoreError::InvalidArgument(_))
        ));
    }
}
