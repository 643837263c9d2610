pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/fees/quote", get(handlers::payments::fee_quote))
        .route(
            "/api/bookings",
            get(handlers::bookings::list_bookings).post(handlers::bookings::create_booking),
        )
        .route("/api/bookings/week", get(handlers::bookings::week_view))
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route(
            "/api/bookings/:id/confirm",
            post(handlers::bookings::confirm_booking),
        )
        .route(
            "/api/bookings/:id/cancel",
            post(handlers::bookings::cancel_booking),
        )
        .route(
            "/api/bookings/:id/complete",
            post(handlers::bookings::complete_booking),
        )
        .route(
            "/api/bookings/:id/notes",
            patch(handlers::bookings::update_notes),
        )
        .route(
            "/api/bookings/:id/payments",
            post(handlers::payments::start_payment),
        )
        .route("/api/payments/:id", get(handlers::payments::get_payment))
        .route(
            "/api/payments/:id/callback",
            post(handlers::payments::payment_callback),
        )
        .route(
            "/api/admin/settings",
            get(handlers::admin::get_settings).post(handlers::admin::update_settings),
        )
        .route(
            "/api/admin/transactions",
            get(handlers::admin::get_transactions),
        )
        .route(
            "/api/admin/transactions/export.csv",
            get(handlers::admin::export_transactions),
        )
        .route("/api/events", get(handlers::events::events_stream))
        .with_state(state)
}
