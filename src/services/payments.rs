use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::errors::{AppError, CoreError};
use crate::models::{Payment, PaymentStatus, Role, SettlementOutcome, Session};
use crate::services::bookings::{ensure_party, now};
use crate::services::events::{broadcast_settlement, handle_payment_settled};
use crate::services::gateway::GatewayStatus;
use crate::services::settlement;
use crate::state::AppState;

/// Opens a payment for a confirmed booking, prompts the customer's handset
/// through the gateway and starts watching for the outcome.
pub async fn start_payment(
    state: &Arc<AppState>,
    session: &Session,
    booking_id: &str,
    mpesa_number: &str,
) -> Result<Payment, AppError> {
    if session.role != Role::Customer {
        return Err(CoreError::NotPermitted {
            actor: session.actor().to_string(),
            action: "pay for a booking".to_string(),
        }
        .into());
    }

    let config = state.mpesa_config()?;
    let payment = {
        let mut store = state.store()?;
        let booking = store
            .booking(booking_id)
            .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;
        ensure_party(session, booking)?;

        if let Some(open) = store.open_payment_for(booking_id) {
            return Err(AppError::Conflict(format!(
                "booking {booking_id} already has {} payment {}",
                open.status, open.id
            )));
        }

        let payment = settlement::initiate_payment(booking, mpesa_number, &config, now())?;
        store.insert_payment(payment.clone());
        payment
    };

    tracing::info!(
        payment_id = %payment.id,
        booking_id = %payment.booking_id,
        amount = %payment.amount,
        service_fee = %payment.service_fee,
        "payment initiated"
    );

    let request = match state
        .gateway
        .initiate(&payment.mpesa_number, payment.total_payable(), &payment.booking_id)
        .await
    {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(error = %e, payment_id = %payment.id, "gateway rejected payment prompt");
            record_settlement(state, &payment.id, SettlementOutcome::Failed, None)?;
            return Err(AppError::Gateway(e.to_string()));
        }
    };

    let payment = {
        let mut store = state.store()?;
        let stored = store
            .payment_mut(&payment.id)
            .ok_or_else(|| AppError::NotFound(format!("payment {}", payment.id)))?;
        stored.checkout_request_id = Some(request.checkout_request_id.clone());
        stored.clone()
    };

    spawn_settlement_poller(
        Arc::clone(state),
        payment.id.clone(),
        request.checkout_request_id,
    );
    Ok(payment)
}

pub fn get(state: &AppState, id: &str) -> Result<Payment, AppError> {
    state
        .store()?
        .payment(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("payment {id}")))
}

/// Settles a payment exactly once, applies it to the booking under the same
/// store guard and publishes the resulting event. A second attempt fails with
/// `AlreadySettled`.
pub fn record_settlement(
    state: &AppState,
    payment_id: &str,
    outcome: SettlementOutcome,
    transaction_id: Option<String>,
) -> Result<Payment, AppError> {
    let (settled, event) = {
        let mut store = state.store()?;
        let payment = store
            .payment_mut(payment_id)
            .ok_or_else(|| AppError::NotFound(format!("payment {payment_id}")))?;
        let (settled, event) = settlement::settle_payment(payment, outcome, transaction_id, now())?;
        *payment = settled.clone();
        handle_payment_settled(&mut store, &event)?;
        (settled, event)
    };

    tracing::info!(
        payment_id = %settled.id,
        booking_id = %settled.booking_id,
        status = %settled.status,
        transaction_id = settled.transaction_id.as_deref().unwrap_or(""),
        "payment settled"
    );

    broadcast_settlement(state, event);
    Ok(settled)
}

/// Polls the gateway until the payment reaches a final status or the
/// configured deadline passes, in which case the payment is failed.
pub fn spawn_settlement_poller(
    state: Arc<AppState>,
    payment_id: String,
    checkout_request_id: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let deadline = state.config.payment_timeout();
        let polled = tokio::time::timeout(
            deadline,
            poll_until_final(&state, &payment_id, &checkout_request_id),
        )
        .await;

        let outcome = match polled {
            Ok(Some(outcome)) => outcome,
            Ok(None) => return,
            Err(_) => {
                tracing::warn!(payment_id = %payment_id, ?deadline, "payment timed out");
                SettlementOutcome::Failed
            }
        };

        match record_settlement(&state, &payment_id, outcome, None) {
            Ok(_) => {}
            Err(AppError::Core(CoreError::AlreadySettled(status))) => {
                tracing::debug!(payment_id = %payment_id, %status, "payment settled elsewhere first");
            }
            Err(e) => {
                tracing::error!(error = %e, payment_id = %payment_id, "failed to record settlement");
            }
        }
    })
}

/// `None` once something else (e.g. the gateway callback) settled the payment.
async fn poll_until_final(
    state: &AppState,
    payment_id: &str,
    checkout_request_id: &str,
) -> Option<SettlementOutcome> {
    let mut interval = tokio::time::interval(state.config.payment_poll_interval());
    loop {
        interval.tick().await;

        if !is_pending(state, payment_id) {
            return None;
        }

        match state.gateway.poll_status(checkout_request_id).await {
            Ok(GatewayStatus::Completed) => return Some(SettlementOutcome::Completed),
            Ok(GatewayStatus::Failed) => return Some(SettlementOutcome::Failed),
            Ok(GatewayStatus::Pending) => {}
            Err(e) => {
                tracing::warn!(error = %e, checkout_request_id, "gateway status poll failed");
            }
        }
    }
}

fn is_pending(state: &AppState, payment_id: &str) -> bool {
    match state.store() {
        Ok(store) => store
            .payment(payment_id)
            .is_some_and(|p| p.status == PaymentStatus::Pending),
        Err(_) => false,
    }
}
