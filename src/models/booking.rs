//! Booking model and related request types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// One reserved slot.
///
/// `(giorno, ora)` is unique across all rows: at most one booking occupies a
/// given slot, enforced by the database. A group booking is `group_size`
/// consecutive rows sharing one `token`, with `slot_index` 1..group_size
/// giving their order. Rows are never mutated except for relocation; cancel
/// and reschedule are row-level deletes and inserts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: i32,
    pub nome: String,
    pub cognome: String,
    pub email: String,
    pub telefono: String,
    /// Appointment date
    pub giorno: NaiveDate,
    /// Slot start time, `HH:MM`
    pub ora: String,
    /// Self-service token shared by all rows of a group (absent on admin rows)
    pub token: Option<String>,
    pub group_size: i16,
    /// 1-based position within the group
    pub slot_index: i16,
    pub crea_date: Option<DateTime<Utc>>,
}

/// Fields inserted for a new booking row
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub nome: String,
    pub cognome: String,
    pub email: String,
    pub telefono: String,
    pub giorno: NaiveDate,
    pub ora: String,
    pub token: Option<String>,
    pub group_size: i16,
    pub slot_index: i16,
}

/// Create booking request (authenticated client)
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    /// Appointment date (YYYY-MM-DD)
    pub giorno: String,
    /// Slot start time (HH:MM)
    pub ora: String,
    /// Group size, clamped to 1..=3
    pub group_size: Option<i64>,
}

/// Cancel booking request, keyed by the natural slot key
#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelBookingRequest {
    pub giorno: String,
    pub ora: String,
}

/// Guest checkout request: a booking plus the minimal profile to attach it to
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GuestBookingRequest {
    #[validate(length(min = 1, message = "nome is required"))]
    pub nome: String,
    #[validate(length(min = 1, message = "cognome is required"))]
    pub cognome: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub giorno: String,
    pub ora: String,
    pub group_size: Option<i64>,
}

/// Admin booking request: only the surname and the slot are mandatory
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminBookingRequest {
    pub nome: Option<String>,
    pub cognome: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub giorno: String,
    pub ora: String,
}

/// Admin relocation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveBookingRequest {
    pub old_giorno: String,
    pub old_ora: String,
    pub new_giorno: String,
    pub new_ora: String,
}

/// Token-based reschedule request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RescheduleRequest {
    pub new_giorno: Option<String>,
    pub new_ora: Option<String>,
}

/// Per-user booking statistics
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingStats {
    pub count: i64,
    /// Most recent booked date, if any
    pub last_date: Option<NaiveDate>,
}
