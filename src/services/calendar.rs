//! Calendar rule engine
//!
//! Pure functions of the business-hours configuration: which days are open
//! and which slot labels exist on a given date. No state, no I/O.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::config::BusinessHoursConfig;

#[derive(Clone)]
pub struct CalendarService {
    hours: BusinessHoursConfig,
}

impl CalendarService {
    pub fn new(hours: BusinessHoursConfig) -> Self {
        Self { hours }
    }

    /// True iff the date's weekday is in the configured open-days set.
    /// Monday through Saturday by default; Sunday is always closed.
    pub fn is_day_available(&self, giorno: NaiveDate) -> bool {
        self.hours
            .days_open
            .contains(&giorno.weekday().number_from_monday())
    }

    /// Ordered slot table for a date.
    ///
    /// Saturday has its own day class; every other day shares the weekday
    /// class. Base slots are morning ++ afternoon, taken literally from
    /// configuration. With `include_extra` the pre-opening slot is prepended
    /// and the day class's evening slots appended; the concatenated order is
    /// what consecutive-group booking walks, so a group starting in a normal
    /// slot can spill into the extras only when the caller holds the
    /// privilege at creation time.
    ///
    /// Days outside the open set still produce their class's table; callers
    /// must check `is_day_available` separately.
    pub fn slots_for_day(&self, giorno: NaiveDate, include_extra: bool) -> Vec<String> {
        let saturday = giorno.weekday() == Weekday::Sat;
        let day_hours = if saturday {
            &self.hours.saturday
        } else {
            &self.hours.weekday
        };

        let mut slots: Vec<String> = Vec::new();
        if include_extra {
            slots.push(self.hours.pre_opening_slot.clone());
        }
        slots.extend(day_hours.morning.iter().cloned());
        slots.extend(day_hours.afternoon.iter().cloned());
        if include_extra {
            let extra = if saturday {
                &self.hours.saturday_extra_slots
            } else {
                &self.hours.weekday_extra_slots
            };
            slots.extend(extra.iter().cloned());
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CalendarService {
        CalendarService::new(BusinessHoursConfig::default())
    }

    // 2025-06-04 is a Wednesday, 2025-06-07 a Saturday, 2025-06-08 a Sunday.
    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 4).unwrap()
    }

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 7).unwrap()
    }

    #[test]
    fn sunday_is_closed() {
        let cal = service();
        assert!(!cal.is_day_available(NaiveDate::from_ymd_opt(2025, 6, 8).unwrap()));
        for offset in 0..6 {
            let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
                + chrono::Duration::days(offset);
            assert!(cal.is_day_available(day), "{day} should be open");
        }
    }

    #[test]
    fn weekday_base_slots_match_fixture() {
        let cal = service();
        assert_eq!(
            cal.slots_for_day(wednesday(), false),
            vec![
                "08:30", "09:15", "10:00", "10:45", "11:30", "12:15", "14:00", "14:45",
                "15:30", "16:15", "17:00",
            ]
        );
    }

    #[test]
    fn saturday_base_slots_match_fixture() {
        let cal = service();
        assert_eq!(
            cal.slots_for_day(saturday(), false),
            vec![
                "08:30", "09:15", "10:00", "10:45", "11:30", "12:15", "14:00", "14:45",
            ]
        );
    }

    #[test]
    fn extra_slots_wrap_the_base_table() {
        let cal = service();
        let all = cal.slots_for_day(wednesday(), true);
        assert_eq!(all.first().map(String::as_str), Some("08:00"));
        assert_eq!(all.last().map(String::as_str), Some("23:15"));
        assert_eq!(all.len(), 1 + 11 + 8);

        let all_sat = cal.slots_for_day(saturday(), true);
        assert_eq!(all_sat.first().map(String::as_str), Some("08:00"));
        assert_eq!(all_sat.last().map(String::as_str), Some("23:00"));
        assert_eq!(all_sat.len(), 1 + 8 + 11);
    }

    #[test]
    fn base_is_ordered_subsequence_of_privileged() {
        // Privilege only adds slots; it never removes or reorders the base.
        let cal = service();
        for offset in 0..7 {
            let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
                + chrono::Duration::days(offset);
            let base = cal.slots_for_day(day, false);
            let full = cal.slots_for_day(day, true);

            let mut it = full.iter();
            for slot in &base {
                assert!(
                    it.any(|s| s == slot),
                    "{slot} missing from privileged table on {day}"
                );
            }
        }
    }

    #[test]
    fn slot_tables_are_strictly_increasing() {
        let cal = service();
        for include_extra in [false, true] {
            for day in [wednesday(), saturday()] {
                let table = cal.slots_for_day(day, include_extra);
                for pair in table.windows(2) {
                    assert!(pair[0] < pair[1], "{} !< {} on {day}", pair[0], pair[1]);
                }
            }
        }
    }
}
