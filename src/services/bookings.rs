//! Booking service: slot availability and the booking transaction rules
//!
//! Every operation re-reads the relevant rows before deciding; the service
//! holds no state between calls. Pre-write checks give callers precise
//! errors, while the `UNIQUE (giorno, ora)` constraint in the bookings table
//! settles any race a concurrent writer slips through.

use std::collections::HashSet;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use rand::RngCore;

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{AdminBookingRequest, Booking, BookingStats, NewBooking},
        slot::SlotStatus,
    },
    repository::Repository,
    services::calendar::CalendarService,
};

/// Self-modification is forbidden inside this window before the appointment
const LOCK_WINDOW_HOURS: f64 = 24.0;

const MAX_GROUP_SIZE: i64 = 3;

/// Random 128-bit token, hex encoded, shared by all rows of a group
pub fn generate_booking_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Parse a date in `YYYY-MM-DD` wire format
pub fn parse_giorno(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date: {s} (use YYYY-MM-DD)")))
}

/// Combine a date and an `HH:MM` slot label into the slot's start instant
fn slot_instant(giorno: NaiveDate, ora: &str) -> AppResult<NaiveDateTime> {
    let time = NaiveTime::parse_from_str(ora, "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid time: {ora} (use HH:MM)")))?;
    Ok(giorno.and_time(time))
}

/// Hours from `now` until the slot's start instant (negative if past)
fn hours_until(giorno: NaiveDate, ora: &str, now: NaiveDateTime) -> AppResult<f64> {
    let instant = slot_instant(giorno, ora)?;
    Ok((instant - now).num_seconds() as f64 / 3600.0)
}

/// Classify a day's slot table against the booked and holiday sets.
///
/// Slots whose start instant is not strictly after `now` are dropped
/// entirely, before classification; a slot starting exactly at `now` is gone,
/// not merely unavailable.
fn classify_slots(
    all_slots: &[String],
    giorno: NaiveDate,
    booked: &HashSet<String>,
    holidays: &HashSet<String>,
    now: NaiveDateTime,
) -> Vec<SlotStatus> {
    all_slots
        .iter()
        .filter(|slot| match slot_instant(giorno, slot) {
            Ok(instant) => instant > now,
            Err(_) => false,
        })
        .map(|slot| {
            let is_holiday = holidays.contains(slot.as_str());
            SlotStatus {
                time: slot.clone(),
                available: !booked.contains(slot.as_str()) && !is_holiday,
                is_holiday,
            }
        })
        .collect()
}

/// Resolve the consecutive slot labels for a group starting at `ora`.
///
/// All slots of the group must pass every check before anything is written;
/// the checks run in the order the caller can act on: table membership, table
/// end, holiday, occupancy.
fn plan_group_slots(
    all_slots: &[String],
    ora: &str,
    group_size: usize,
    booked: &HashSet<String>,
    holidays: &HashSet<String>,
) -> AppResult<Vec<String>> {
    let start_index = all_slots
        .iter()
        .position(|s| s == ora)
        .ok_or_else(|| AppError::InvalidSlot(ora.to_string()))?;

    let mut planned = Vec::with_capacity(group_size);
    for i in 0..group_size {
        let slot = all_slots
            .get(start_index + i)
            .ok_or(AppError::InsufficientConsecutiveSlots)?;
        if holidays.contains(slot.as_str()) {
            return Err(AppError::HolidayConflict(slot.clone()));
        }
        if booked.contains(slot.as_str()) {
            return Err(AppError::SlotTaken(slot.clone()));
        }
        planned.push(slot.clone());
    }
    Ok(planned)
}

fn clamp_group_size(requested: Option<i64>) -> usize {
    requested.unwrap_or(1).clamp(1, MAX_GROUP_SIZE) as usize
}

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
    calendar: CalendarService,
}

impl BookingsService {
    pub fn new(repository: Repository, calendar: CalendarService) -> Self {
        Self {
            repository,
            calendar,
        }
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    /// Per-slot availability for a date; empty on closed days.
    /// Read-only and lock-free: the listing may be stale by the time a write
    /// follows, which the write path resolves with `SlotTaken`.
    pub async fn available_slots(
        &self,
        giorno: NaiveDate,
        include_extra: bool,
    ) -> AppResult<Vec<SlotStatus>> {
        if !self.calendar.is_day_available(giorno) {
            return Ok(Vec::new());
        }

        let all_slots = self.calendar.slots_for_day(giorno, include_extra);
        let booked: HashSet<String> = self
            .repository
            .bookings
            .for_day(giorno)
            .await?
            .into_iter()
            .map(|b| b.ora)
            .collect();
        let holidays: HashSet<String> = self
            .repository
            .holidays
            .for_day(giorno)
            .await?
            .into_iter()
            .map(|h| h.ora)
            .collect();

        Ok(classify_slots(
            &all_slots, giorno, &booked, &holidays, self.now(),
        ))
    }

    /// Create a booking of 1 to 3 consecutive slots for a registered client.
    ///
    /// `privileged` is the caller's own VIP/admin standing and decides which
    /// slot table the request is resolved against: without it, extra slots
    /// are not bookable even if the caller knows their labels, and a group
    /// cannot spill past the base table.
    pub async fn create_booking(
        &self,
        owner_email: &str,
        giorno: NaiveDate,
        ora: &str,
        group_size: Option<i64>,
        privileged: bool,
    ) -> AppResult<Booking> {
        let group_size = clamp_group_size(group_size);

        if !self.calendar.is_day_available(giorno) {
            return Err(AppError::UnavailableDay);
        }

        let all_slots = self.calendar.slots_for_day(giorno, privileged);
        let booked: HashSet<String> = self
            .repository
            .bookings
            .for_day(giorno)
            .await?
            .into_iter()
            .map(|b| b.ora)
            .collect();
        let holidays: HashSet<String> = self
            .repository
            .holidays
            .for_day(giorno)
            .await?
            .into_iter()
            .map(|h| h.ora)
            .collect();

        let planned = plan_group_slots(&all_slots, ora, group_size, &booked, &holidays)?;

        let user = self
            .repository
            .users
            .get_by_email(owner_email)
            .await?
            .ok_or_else(|| AppError::UserNotFound(owner_email.to_string()))?;

        let token = generate_booking_token();
        let rows: Vec<NewBooking> = planned
            .iter()
            .enumerate()
            .map(|(i, slot)| NewBooking {
                nome: user.nome.clone(),
                cognome: user.cognome.clone(),
                email: user.email.clone(),
                telefono: user.telefono.clone(),
                giorno,
                ora: slot.clone(),
                token: Some(token.clone()),
                group_size: group_size as i16,
                slot_index: (i + 1) as i16,
            })
            .collect();

        let mut inserted = self.repository.bookings.insert_group(&rows).await?;
        tracing::info!(
            email = %user.email,
            %giorno,
            ora,
            group_size,
            "booking created"
        );
        // The first row is the primary booking; siblings are reachable by token
        Ok(inserted.remove(0))
    }

    /// Cancel the requester's own booking at a slot. Deletes exactly that
    /// row; sibling rows of a group each need their own cancellation.
    pub async fn cancel_booking(
        &self,
        giorno: NaiveDate,
        ora: &str,
        requester_email: &str,
    ) -> AppResult<()> {
        let booking = self
            .repository
            .bookings
            .find_slot(giorno, ora)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No booking at {giorno} {ora}")))?;

        if booking.email != requester_email {
            return Err(AppError::Forbidden(
                "Booking belongs to another client".to_string(),
            ));
        }

        self.repository.bookings.delete_slot(giorno, ora).await?;
        tracing::info!(email = %requester_email, %giorno, ora, "booking cancelled");
        Ok(())
    }

    pub async fn user_bookings(&self, email: &str) -> AppResult<Vec<Booking>> {
        self.repository.bookings.for_user(email).await
    }

    pub async fn user_stats(&self, email: &str) -> AppResult<BookingStats> {
        let bookings = self.repository.bookings.for_user(email).await?;
        let last_date = bookings.iter().map(|b| b.giorno).max();
        Ok(BookingStats {
            count: bookings.len() as i64,
            last_date,
        })
    }

    pub async fn all_bookings(&self) -> AppResult<Vec<Booking>> {
        self.repository.bookings.all().await
    }

    /// Admin booking: one slot, surname is the only mandatory profile field,
    /// no user lookup, no token. The occupancy check still applies; the
    /// day-class and holiday rules deliberately do not.
    pub async fn create_admin_booking(&self, request: &AdminBookingRequest) -> AppResult<Booking> {
        let cognome = request.cognome.trim();
        if cognome.is_empty() {
            return Err(AppError::Validation("cognome is required".to_string()));
        }
        let giorno = parse_giorno(&request.giorno)?;

        if let Some(existing) = self.repository.bookings.find_slot(giorno, &request.ora).await? {
            return Err(AppError::SlotTaken(existing.ora));
        }

        let row = NewBooking {
            nome: request.nome.as_deref().unwrap_or("").trim().to_string(),
            cognome: cognome.to_string(),
            email: request
                .email
                .as_deref()
                .unwrap_or("")
                .trim()
                .to_lowercase(),
            telefono: request.telefono.as_deref().unwrap_or("").trim().to_string(),
            giorno,
            ora: request.ora.clone(),
            token: None,
            group_size: 1,
            slot_index: 1,
        };

        let booking = self.repository.bookings.insert(&row).await?;
        tracing::info!(%giorno, ora = %request.ora, "admin booking created");
        Ok(booking)
    }

    /// Admin cancellation: no ownership check
    pub async fn admin_cancel_booking(&self, giorno: NaiveDate, ora: &str) -> AppResult<()> {
        if !self.repository.bookings.delete_slot(giorno, ora).await? {
            return Err(AppError::NotFound(format!("No booking at {giorno} {ora}")));
        }
        tracing::info!(%giorno, ora, "admin cancelled booking");
        Ok(())
    }

    /// Relocate a booking to a free, non-holiday slot. Runs as a single
    /// UPDATE so a crash cannot strand the booking between slots.
    pub async fn move_booking(
        &self,
        old_giorno: NaiveDate,
        old_ora: &str,
        new_giorno: NaiveDate,
        new_ora: &str,
    ) -> AppResult<Booking> {
        if let Some(existing) = self.repository.bookings.find_slot(new_giorno, new_ora).await? {
            return Err(AppError::SlotTaken(existing.ora));
        }
        if self.repository.holidays.exists(new_giorno, new_ora).await? {
            return Err(AppError::HolidayConflict(new_ora.to_string()));
        }

        let moved = self
            .repository
            .bookings
            .move_slot(old_giorno, old_ora, new_giorno, new_ora)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No booking at {old_giorno} {old_ora}"))
            })?;

        tracing::info!(
            %old_giorno, old_ora, %new_giorno, new_ora,
            "booking moved"
        );
        Ok(moved)
    }

    /// Primary row for a self-service token
    pub async fn booking_by_token(&self, token: &str) -> AppResult<Booking> {
        self.repository
            .bookings
            .by_token(token)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
    }

    /// Token-based reschedule, blocked inside the 24-hour lock window.
    ///
    /// The occupancy check excludes the booking's own token, so rescheduling
    /// onto the slot it already holds trivially succeeds. Per the original
    /// system, the reschedule collapses a group to a single seat at the new
    /// slot, keeping the same token.
    pub async fn update_booking_by_token(
        &self,
        token: &str,
        new_giorno: Option<&str>,
        new_ora: Option<&str>,
    ) -> AppResult<Booking> {
        let booking = self.booking_by_token(token).await?;

        if hours_until(booking.giorno, &booking.ora, self.now())? < LOCK_WINDOW_HOURS {
            return Err(AppError::LockWindow);
        }

        let target_giorno = match new_giorno {
            Some(s) => parse_giorno(s)?,
            None => booking.giorno,
        };
        let target_ora = new_ora.unwrap_or(&booking.ora).to_string();

        let slot_changed = target_giorno != booking.giorno || target_ora != booking.ora;
        if slot_changed {
            if let Some(existing) = self
                .repository
                .bookings
                .find_slot(target_giorno, &target_ora)
                .await?
            {
                if existing.token.as_deref() != Some(token) {
                    return Err(AppError::SlotTaken(target_ora));
                }
            }
            if self
                .repository
                .holidays
                .exists(target_giorno, &target_ora)
                .await?
            {
                return Err(AppError::HolidayConflict(target_ora));
            }
        }

        let replacement = NewBooking {
            nome: booking.nome,
            cognome: booking.cognome,
            email: booking.email,
            telefono: booking.telefono,
            giorno: target_giorno,
            ora: target_ora,
            token: Some(token.to_string()),
            group_size: 1,
            slot_index: 1,
        };

        let updated = self
            .repository
            .bookings
            .replace_token_rows(token, &replacement)
            .await?;
        tracing::info!(token, giorno = %updated.giorno, ora = %updated.ora, "booking rescheduled");
        Ok(updated)
    }

    /// Token-based cancellation of every row in the group, blocked inside
    /// the 24-hour lock window.
    pub async fn cancel_booking_by_token(&self, token: &str) -> AppResult<()> {
        let booking = self.booking_by_token(token).await?;

        if hours_until(booking.giorno, &booking.ora, self.now())? < LOCK_WINDOW_HOURS {
            return Err(AppError::LockWindow);
        }

        let removed = self.repository.bookings.delete_by_token(token).await?;
        tracing::info!(token, removed, "booking cancelled via token");
        Ok(())
    }

    /// Bookings-per-day counts for the trailing `days` days, zero-filled
    pub async fn daily_counts(&self, days: u32) -> AppResult<Vec<(NaiveDate, i64)>> {
        let today = self.now().date();
        let start = today - chrono::Duration::days(days as i64 - 1);
        let counted = self.repository.bookings.counts_by_day(start, today).await?;

        let mut result = Vec::with_capacity(days as usize);
        for offset in 0..days as i64 {
            let day = start + chrono::Duration::days(offset);
            let count = counted
                .iter()
                .find(|(d, _)| *d == day)
                .map(|(_, n)| *n)
                .unwrap_or(0);
            result.push((day, count));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn set(labels: &[&str]) -> HashSet<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 4).unwrap()
    }

    #[test]
    fn token_is_128_bit_hex() {
        let token = generate_booking_token();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_booking_token());
    }

    #[test]
    fn classify_drops_past_slots_with_strict_boundary() {
        let slots = table(&["09:15", "10:00", "10:45"]);
        // Now is exactly the 10:00 slot start: 10:00 must disappear, not
        // show as unavailable.
        let now = wednesday().and_hms_opt(10, 0, 0).unwrap();
        let statuses = classify_slots(&slots, wednesday(), &set(&[]), &set(&[]), now);
        let times: Vec<&str> = statuses.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(times, vec!["10:45"]);
    }

    #[test]
    fn classify_marks_booked_and_holiday() {
        let slots = table(&["09:15", "10:00", "10:45"]);
        let now = wednesday().and_hms_opt(0, 0, 0).unwrap();
        let statuses = classify_slots(
            &slots,
            wednesday(),
            &set(&["09:15"]),
            &set(&["10:00"]),
            now,
        );
        assert_eq!(
            statuses,
            vec![
                SlotStatus {
                    time: "09:15".into(),
                    available: false,
                    is_holiday: false
                },
                SlotStatus {
                    time: "10:00".into(),
                    available: false,
                    is_holiday: true
                },
                SlotStatus {
                    time: "10:45".into(),
                    available: true,
                    is_holiday: false
                },
            ]
        );
    }

    #[test]
    fn plan_rejects_unknown_slot() {
        let slots = table(&["09:15", "10:00"]);
        let err = plan_group_slots(&slots, "09:20", 1, &set(&[]), &set(&[])).unwrap_err();
        assert!(matches!(err, AppError::InvalidSlot(_)));
    }

    #[test]
    fn plan_rejects_group_running_past_table_end() {
        let slots = table(&["16:15", "17:00"]);
        let err = plan_group_slots(&slots, "17:00", 3, &set(&[]), &set(&[])).unwrap_err();
        assert!(matches!(err, AppError::InsufficientConsecutiveSlots));
    }

    #[test]
    fn plan_full_group_three_slots_from_end_succeeds() {
        let slots = table(&["14:45", "15:30", "16:15", "17:00"]);
        let planned = plan_group_slots(&slots, "15:30", 3, &set(&[]), &set(&[])).unwrap();
        assert_eq!(planned, table(&["15:30", "16:15", "17:00"]));
    }

    #[test]
    fn plan_rejects_holiday_anywhere_in_group() {
        let slots = table(&["14:00", "14:45", "15:30"]);
        let err =
            plan_group_slots(&slots, "14:00", 3, &set(&[]), &set(&["15:30"])).unwrap_err();
        assert!(matches!(err, AppError::HolidayConflict(s) if s == "15:30"));
    }

    #[test]
    fn plan_rejects_taken_slot_anywhere_in_group() {
        let slots = table(&["14:00", "14:45", "15:30"]);
        let err =
            plan_group_slots(&slots, "14:00", 2, &set(&["14:45"]), &set(&[])).unwrap_err();
        assert!(matches!(err, AppError::SlotTaken(s) if s == "14:45"));
    }

    #[test]
    fn holiday_outranks_occupancy_for_the_same_slot() {
        let slots = table(&["14:00"]);
        let err = plan_group_slots(&slots, "14:00", 1, &set(&["14:00"]), &set(&["14:00"]))
            .unwrap_err();
        assert!(matches!(err, AppError::HolidayConflict(_)));
    }

    #[test]
    fn group_size_clamped_to_one_through_three() {
        assert_eq!(clamp_group_size(None), 1);
        assert_eq!(clamp_group_size(Some(0)), 1);
        assert_eq!(clamp_group_size(Some(-5)), 1);
        assert_eq!(clamp_group_size(Some(2)), 2);
        assert_eq!(clamp_group_size(Some(7)), 3);
    }

    #[test]
    fn lock_window_boundary_is_inclusive_on_the_allowed_side() {
        let appointment = NaiveDate::from_ymd_opt(2025, 6, 5).unwrap();
        // Exactly 24 hours before: allowed
        let now = NaiveDate::from_ymd_opt(2025, 6, 4)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let h = hours_until(appointment, "10:00", now).unwrap();
        assert_eq!(h, 24.0);
        assert!(h >= LOCK_WINDOW_HOURS);

        // One second later: locked
        let h = hours_until(appointment, "10:00", now + chrono::Duration::seconds(1)).unwrap();
        assert!(h < LOCK_WINDOW_HOURS);
    }

    #[test]
    fn giorno_parsing_enforces_wire_format() {
        assert!(parse_giorno("2025-06-04").is_ok());
        assert!(matches!(
            parse_giorno("04/06/2025"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(parse_giorno(""), Err(AppError::Validation(_))));
    }
}
