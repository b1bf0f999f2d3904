//! Working calendar: weekday rules plus a holiday table
//!
//! Mandatory holidays are always excluded from business-day counts. Optional
//! holidays are excluded only when `observe_optional` is set.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::dates::ExclusionPolicy;

/// A single non-working date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,

    pub name: String,

    /// Optional holidays are only observed when the calendar opts in
    #[serde(default)]
    pub optional: bool,
}

impl Holiday {
    pub fn new(date: NaiveDate, name: impl Into<String>, optional: bool) -> Self {
        Self {
            date,
            name: name.into(),
            optional,
        }
    }
}

fn default_working_days() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ]
}

/// Calendar used to decide which days count as business days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayCalendar {
    /// Weekdays that are normally worked
    pub working_days: Vec<Weekday>,

    /// Observe optional holidays as non-working days
    pub observe_optional: bool,

    /// Holiday table, kept sorted by date
    pub holidays: Vec<Holiday>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self {
            working_days: default_working_days(),
            observe_optional: false,
            holidays: Vec::new(),
        }
    }
}

impl HolidayCalendar {
    /// Creates a calendar with the default Monday-Friday work week
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `weekday` is normally worked
    pub fn is_working_weekday(&self, weekday: Weekday) -> bool {
        self.working_days.contains(&weekday)
    }

    /// Returns the holiday on `date`, if any
    pub fn holiday_on(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.iter().find(|h| h.date == date)
    }

    /// Adds a holiday, replacing any existing entry on the same date
    pub fn add_holiday(&mut self, holiday: Holiday) {
        self.holidays.retain(|h| h.date != holiday.date);
        self.holidays.push(holiday);
        self.holidays.sort_by_key(|h| h.date);
    }

    /// Removes the holiday on `date`, returning it if present
    pub fn remove_holiday(&mut self, date: NaiveDate) -> Option<Holiday> {
        let index = self.holidays.iter().position(|h| h.date == date)?;
        Some(self.holidays.remove(index))
    }
}

impl ExclusionPolicy for HolidayCalendar {
    fn is_excluded(&self, date: NaiveDate) -> bool {
        if !self.is_working_weekday(date.weekday()) {
            return true;
        }

        match self.holiday_on(date) {
            Some(holiday) => !holiday.optional || self.observe_optional,
            None => false,
        }
    }
}
