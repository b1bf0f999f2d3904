//! Date arithmetic for task schedules
//!
//! A task carries two independent (start, end, duration) triples: planned and
//! actual. Durations are inclusive calendar days, so a one-day task starts and
//! ends on the same date.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest run of excluded days `add_business_days` will scan before giving up
const MAX_EXCLUDED_RUN: u32 = 3660;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Date out of range: {days} day(s) from {date}")]
    OutOfRange { date: NaiveDate, days: u32 },
}

/// Returns the end date of a task of `duration` days starting on `start`
///
/// A duration of 0 is treated as 1. Fails if the end falls outside the
/// representable calendar.
pub fn end_from_start_and_duration(
    start: NaiveDate,
    duration: u32,
) -> Result<NaiveDate, DateError> {
    let offset = duration.max(1) - 1;
    start
        .checked_add_days(Days::new(u64::from(offset)))
        .ok_or(DateError::OutOfRange {
            date: start,
            days: offset,
        })
}

/// Returns the start date of a task of `duration` days ending on `end`
pub fn start_from_end_and_duration(end: NaiveDate, duration: u32) -> Result<NaiveDate, DateError> {
    let offset = duration.max(1) - 1;
    end.checked_sub_days(Days::new(u64::from(offset)))
        .ok_or(DateError::OutOfRange {
            date: end,
            days: offset,
        })
}

/// Returns the inclusive number of calendar days from `start` to `end`
pub fn duration_from_start_and_end(start: NaiveDate, end: NaiveDate) -> Result<u32, DateError> {
    if end < start {
        return Err(DateError::InvalidRange { start, end });
    }
    let days = (end - start).num_days() + 1;
    u32::try_from(days).map_err(|_| DateError::InvalidRange { start, end })
}

/// Computes the missing member of a (start, end, duration) triple
pub fn reconcile_triple(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    duration: Option<u32>,
) -> Result<DateTriple, DateError> {
    DateTriple {
        start,
        end,
        duration,
    }
    .reconcile()
}

/// A (start, end, duration) triple where one member is derived from the others
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTriple {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,

    /// Inclusive duration in calendar days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl DateTriple {
    /// Creates a triple with only a duration set
    pub fn with_duration(duration: u32) -> Self {
        Self {
            start: None,
            end: None,
            duration: Some(duration.max(1)),
        }
    }

    /// Creates a reconciled triple from a start date and duration
    pub fn starting(start: NaiveDate, duration: u32) -> Result<Self, DateError> {
        let duration = duration.max(1);
        Ok(Self {
            start: Some(start),
            end: Some(end_from_start_and_duration(start, duration)?),
            duration: Some(duration),
        })
    }

    /// Returns true if no member is known
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.duration.is_none()
    }

    /// Derives the missing member from the other two
    ///
    /// With all three known, duration is authoritative and end is recomputed.
    /// With fewer than two known, the triple is returned unchanged.
    pub fn reconcile(self) -> Result<Self, DateError> {
        match (self.start, self.end, self.duration) {
            (Some(start), _, Some(duration)) => Self::starting(start, duration),
            (Some(start), Some(end), None) => Ok(Self {
                start: Some(start),
                end: Some(end),
                duration: Some(duration_from_start_and_end(start, end)?),
            }),
            (None, Some(end), Some(duration)) => {
                let duration = duration.max(1);
                Ok(Self {
                    start: Some(start_from_end_and_duration(end, duration)?),
                    end: Some(end),
                    duration: Some(duration),
                })
            }
            _ => Ok(self),
        }
    }

    /// Applies a partial update before reconciliation
    ///
    /// Members named by the patch win. An end date set without a duration
    /// drops the stored duration (when a start is known) so the new end sticks.
    pub fn merge(self, patch: &DatePatch) -> Self {
        let mut merged = self;

        if let Some(start) = patch.start {
            merged.start = Some(start);
        }

        match (patch.end, patch.duration) {
            (Some(end), Some(duration)) => {
                merged.end = Some(end);
                merged.duration = Some(duration);
            }
            (Some(end), None) => {
                merged.end = Some(end);
                if merged.start.is_some() {
                    merged.duration = None;
                }
            }
            (None, Some(duration)) => merged.duration = Some(duration),
            (None, None) => {}
        }

        merged
    }
}

/// Partial update of a date triple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatePatch {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub duration: Option<u32>,
}

impl DatePatch {
    /// Returns true if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.duration.is_none()
    }
}

/// Decides which calendar days are not worked
pub trait ExclusionPolicy {
    /// Returns true if no work happens on `date`
    fn is_excluded(&self, date: NaiveDate) -> bool;
}

/// Policy that excludes nothing (every calendar day is a business day)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExclusions;

impl ExclusionPolicy for NoExclusions {
    fn is_excluded(&self, _date: NaiveDate) -> bool {
        false
    }
}

impl<F> ExclusionPolicy for F
where
    F: Fn(NaiveDate) -> bool,
{
    fn is_excluded(&self, date: NaiveDate) -> bool {
        self(date)
    }
}

/// Returns true if `date` is worked under `policy`
pub fn is_business_day<P: ExclusionPolicy + ?Sized>(date: NaiveDate, policy: &P) -> bool {
    !policy.is_excluded(date)
}

/// Counts business days from `start` to `end`, both inclusive
pub fn count_business_days<P: ExclusionPolicy + ?Sized>(
    start: NaiveDate,
    end: NaiveDate,
    policy: &P,
) -> Result<u32, DateError> {
    if end < start {
        return Err(DateError::InvalidRange { start, end });
    }

    let count = start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_business_day(*day, policy))
        .count();

    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Returns the date on which `days` business days starting at `start` are done
///
/// Returns `None` if the policy never yields enough business days.
pub fn add_business_days<P: ExclusionPolicy + ?Sized>(
    start: NaiveDate,
    days: u32,
    policy: &P,
) -> Option<NaiveDate> {
    let mut remaining = days.max(1);
    let mut excluded_run = 0;

    for day in start.iter_days() {
        if is_business_day(day, policy) {
            excluded_run = 0;
            remaining -= 1;
            if remaining == 0 {
                return Some(day);
            }
        } else {
            excluded_run += 1;
            if excluded_run > MAX_EXCLUDED_RUN {
                return None;
            }
        }
    }

    None
}
