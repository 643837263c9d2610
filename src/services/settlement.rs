use chrono::NaiveDateTime;

use crate::errors::CoreError;
use crate::models::{
    Booking, BookingStatus, MpesaConfig, Payment, PaymentSettled, PaymentStatus,
    SettlementOutcome,
};
use crate::services::fees::compute_service_fee;
use crate::services::phone::normalize_phone;

/// Opens a pending payment for a confirmed booking. The fee percentage is
/// captured from `config` at this point and never recomputed.
pub fn initiate_payment(
    booking: &Booking,
    mpesa_number: &str,
    config: &MpesaConfig,
    now: NaiveDateTime,
) -> Result<Payment, CoreError> {
    if booking.status != BookingStatus::Confirmed {
        return Err(CoreError::NotPayable(booking.status));
    }
    let mpesa_number = normalize_phone(mpesa_number)?;
    let service_fee = compute_service_fee(booking.total_amount, config.service_fee_percentage)?;

    Ok(Payment {
        id: uuid::Uuid::new_v4().to_string(),
        booking_id: booking.id.clone(),
        amount: booking.total_amount,
        service_fee,
        fee_percentage: config.service_fee_percentage,
        status: PaymentStatus::Pending,
        mpesa_number,
        transaction_id: None,
        checkout_request_id: None,
        created_at: now,
        updated_at: now,
    })
}

/// Finalizes a pending payment and returns the settled copy together with the
/// event the booking lifecycle consumes. A completed payment always carries a
/// transaction id, generated when the gateway did not supply one.
pub fn settle_payment(
    payment: &Payment,
    outcome: SettlementOutcome,
    transaction_id: Option<String>,
    now: NaiveDateTime,
) -> Result<(Payment, PaymentSettled), CoreError> {
    if payment.status != PaymentStatus::Pending {
        return Err(CoreError::AlreadySettled(payment.status));
    }

    let transaction_id = match outcome {
        SettlementOutcome::Completed => Some(
            transaction_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(generate_transaction_id),
        ),
        SettlementOutcome::Failed => None,
    };

    let mut settled = payment.clone();
    settled.status = outcome.into();
    settled.transaction_id = transaction_id.clone();
    settled.updated_at = now;

    let event = PaymentSettled {
        payment_id: settled.id.clone(),
        booking_id: settled.booking_id.clone(),
        outcome,
        transaction_id,
        settled_at: now,
    };
    Ok((settled, event))
}

/// M-Pesa style receipt reference, e.g. `MP3F9A1C2B7D`.
fn generate_transaction_id() -> String {
    let raw = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!("MP{}", &raw[..10])
}
