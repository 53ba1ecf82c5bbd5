//! Derived slot availability types

use serde::Serialize;
use utoipa::ToSchema;

/// Per-slot status computed on each availability request, never persisted.
///
/// `available` means: not booked, not a holiday, and strictly in the future.
/// Past slots never appear at all; the resolver drops them before
/// classification rather than listing them as unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SlotStatus {
    /// Slot start time, `HH:MM`
    pub time: String,
    pub available: bool,
    pub is_holiday: bool,
}
