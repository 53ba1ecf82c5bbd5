//! Holiday (blackout slot) model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// An admin-declared blackout of one specific slot.
///
/// Unique per `(giorno, ora)` pair; blocks booking creation regardless of the
/// caller's privilege. Independent of day-level closure.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Holiday {
    pub id: i32,
    pub giorno: NaiveDate,
    /// Slot start time, `HH:MM`
    pub ora: String,
}

/// One slot in a holiday add/remove request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HolidaySlot {
    /// Date (YYYY-MM-DD)
    pub giorno: String,
    /// Slot start time (HH:MM)
    pub ora: String,
}

/// Bulk add/remove payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct HolidaySlotsRequest {
    pub slots: Vec<HolidaySlot>,
}
