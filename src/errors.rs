use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::{BookingStatus, PaymentStatus};

/// Failures raised by the booking and payment domain functions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed time slot: {0}")]
    MalformedTimeSlot(String),

    #[error("invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    #[error("cannot move booking from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("cannot move booking from {from} to {to}: {reason}")]
    GuardRejected {
        from: BookingStatus,
        to: BookingStatus,
        reason: String,
    },

    #[error("payment already settled as {0}")]
    AlreadySettled(PaymentStatus),

    #[error("time slot conflicts with booking {booking_id}")]
    SlotConflict { booking_id: String },

    #[error("booking is {0}, only confirmed bookings can be paid")]
    NotPayable(BookingStatus),

    #[error("{actor} may not {action}")]
    NotPermitted { actor: String, action: String },
}

impl CoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CoreError::InvalidArgument(_)
            | CoreError::MalformedTimeSlot(_)
            | CoreError::InvalidPhoneNumber(_) => StatusCode::BAD_REQUEST,
            CoreError::InvalidTransition { .. }
            | CoreError::GuardRejected { .. }
            | CoreError::AlreadySettled(_)
            | CoreError::SlotConflict { .. } => StatusCode::CONFLICT,
            CoreError::NotPayable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CoreError::NotPermitted { .. } => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("payment gateway error: {0}")]
    Gateway(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Core(e) => e.status_code(),
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
