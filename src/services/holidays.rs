//! Holiday (blackout slot) management service

use crate::{
    error::AppResult,
    models::holiday::{Holiday, HolidaySlot},
    repository::Repository,
    services::bookings::parse_giorno,
};

#[derive(Clone)]
pub struct HolidaysService {
    repository: Repository,
}

impl HolidaysService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Holiday>> {
        self.repository.holidays.all().await
    }

    /// Add blackout slots; pairs already present are skipped silently.
    /// Returns the slots actually added.
    ///
    /// Blacking out an already-booked slot is permitted (the booking stays;
    /// the admin is expected to resolve the overlap by hand), but it is worth
    /// a warning in the log.
    pub async fn add_slots(&self, slots: &[HolidaySlot]) -> AppResult<Vec<HolidaySlot>> {
        let mut added = Vec::new();
        for slot in slots {
            let giorno = parse_giorno(&slot.giorno)?;

            if self
                .repository
                .bookings
                .find_slot(giorno, &slot.ora)
                .await?
                .is_some()
            {
                tracing::warn!(
                    %giorno,
                    ora = %slot.ora,
                    "holiday added over an existing booking"
                );
            }

            if self.repository.holidays.insert(giorno, &slot.ora).await? {
                added.push(slot.clone());
            }
        }
        Ok(added)
    }

    /// Remove blackout slots; returns how many existed and were removed
    pub async fn remove_slots(&self, slots: &[HolidaySlot]) -> AppResult<u64> {
        let mut removed = 0;
        for slot in slots {
            let giorno = parse_giorno(&slot.giorno)?;
            if self.repository.holidays.delete(giorno, &slot.ora).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
