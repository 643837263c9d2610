pub mod admin;
pub mod bookings;
pub mod events;
pub mod health;
pub mod payments;

use axum::http::HeaderMap;

use crate::errors::AppError;
use crate::models::{Role, Session};

/// Reads the identity forwarded by the auth layer in front of this service.
pub fn session_from_headers(headers: &HeaderMap) -> Result<Session, AppError> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let user_id = header("x-user-id").ok_or(AppError::Unauthorized)?;
    let role = header("x-user-role")
        .and_then(Role::parse)
        .ok_or(AppError::Unauthorized)?;

    Ok(Session {
        user_id: user_id.to_string(),
        role,
    })
}

pub fn check_admin(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
