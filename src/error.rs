//! Error types for the Lev Space server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main application error type
///
/// The booking-specific variants mirror the failure modes of the slot engine:
/// every one of them is a terminal answer to the caller, never retried
/// internally. The caller's only recovery is to re-read availability and
/// resubmit.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("The selected day is not a working day")]
    UnavailableDay,

    #[error("Invalid slot: {0} is not in the day's slot table")]
    InvalidSlot(String),

    #[error("Not enough consecutive free slots for the requested group")]
    InsufficientConsecutiveSlots,

    #[error("Slot {0} is blocked by a holiday")]
    HolidayConflict(String),

    #[error("Slot {0} is already taken")]
    SlotTaken(String),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Bookings cannot be modified within 24 hours of the appointment")]
    LockWindow,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl AppError {
    /// Stable machine-readable kind, used in response bodies and logs
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "authentication",
            AppError::Validation(_) => "validation",
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::UnavailableDay => "unavailable_day",
            AppError::InvalidSlot(_) => "invalid_slot",
            AppError::InsufficientConsecutiveSlots => "insufficient_consecutive_slots",
            AppError::HolidayConflict(_) => "holiday_conflict",
            AppError::SlotTaken(_) => "slot_taken",
            AppError::UserNotFound(_) => "user_not_found",
            AppError::LockWindow => "lock_window",
            AppError::Database(_) => "database",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::UnavailableDay
            | AppError::InvalidSlot(_)
            | AppError::InsufficientConsecutiveSlots => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::HolidayConflict(_) | AppError::SlotTaken(_) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::UserNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::LockWindow => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: self.kind().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
