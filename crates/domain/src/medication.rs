use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// A valid 24-hour clock value at which a `Medication` is due every day
/// of its course. Ordered chronologically within the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    hours: u32,
    minutes: u32,
}

impl TimeOfDay {
    pub fn new(hours: u32, minutes: u32) -> Result<Self, InvalidTimeOfDayError> {
        if hours > 23 || minutes > 59 {
            return Err(InvalidTimeOfDayError::OutOfRange(hours, minutes));
        }
        Ok(Self { hours, minutes })
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidTimeOfDayError {
    #[error("Time of day: {0} is malformed, expected the format HH:MM")]
    Malformed(String),
    #[error("Time of day with hours: {0} and minutes: {1} is not a valid 24-hour clock value")]
    OutOfRange(u32, u32),
}

impl FromStr for TimeOfDay {
    type Err = InvalidTimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidTimeOfDayError::Malformed(s.to_string());
        let mut parts = s.splitn(2, ':');
        let hours = parts
            .next()
            .and_then(|h| h.parse::<u32>().ok())
            .ok_or_else(malformed)?;
        let minutes = parts
            .next()
            .and_then(|m| m.parse::<u32>().ok())
            .ok_or_else(malformed)?;
        TimeOfDay::new(hours, minutes)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TimeOfDayVisitor;

        impl<'de> Visitor<'de> for TimeOfDayVisitor {
            type Value = TimeOfDay;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A time of day in the format HH:MM")
            }

            fn visit_str<E>(self, value: &str) -> Result<TimeOfDay, E>
            where
                E: serde::de::Error,
            {
                value.parse::<TimeOfDay>().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimeOfDayVisitor)
    }
}

/// One medication course for a user: a daily time of day, a start date and
/// a duration in whole days. The course is identified by its name within
/// the owning `UserRecord`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub time_of_day: TimeOfDay,
    pub start_date: NaiveDate,
    pub duration_days: i64,
}

impl Medication {
    pub fn new(time_of_day: TimeOfDay, start_date: NaiveDate, duration_days: i64) -> Self {
        Self {
            time_of_day,
            start_date,
            duration_days,
        }
    }

    /// First calendar date after the course: a 3-day course started on day
    /// 0 covers days 0, 1 and 2. Saturates at the calendar's maximum date
    /// instead of overflowing on absurd durations.
    pub fn end_date(&self) -> NaiveDate {
        self.start_date
            .checked_add_signed(Duration::days(self.duration_days))
            .unwrap_or(NaiveDate::MAX)
    }

    /// The course expires at the midnight ending its last day. An instant
    /// exactly at the boundary is still considered within the course.
    pub fn expiry_boundary(&self) -> DateTime<Utc> {
        let midnight = self
            .end_date()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time");
        Utc.from_utc_datetime(&midnight)
    }

    pub fn is_active(&self, at: DateTime<Utc>) -> bool {
        at <= self.expiry_boundary()
    }

    /// Number of course days left at `at`, never negative.
    pub fn days_left(&self, at: DateTime<Utc>) -> i64 {
        (self.end_date() - at.naive_utc().date()).num_days().max(0)
    }

    /// The next instant at or after `reference` matching this medication's
    /// time of day, or `None` when the course has expired or the computed
    /// instant falls after the expiry boundary.
    pub fn next_occurrence(&self, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.is_active(reference) {
            return None;
        }
        let candidate = self.due_at(reference.naive_utc().date())?;
        let due = if candidate < reference {
            candidate + Duration::days(1)
        } else {
            candidate
        };
        if due > self.expiry_boundary() {
            None
        } else {
            Some(due)
        }
    }

    /// Like `next_occurrence` but strictly after `instant`. Used to re-arm
    /// after a firing so the just-fired instant is never recomputed.
    pub fn next_occurrence_after(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let candidate = self.due_at(instant.naive_utc().date())?;
        let due = if candidate <= instant {
            candidate + Duration::days(1)
        } else {
            candidate
        };
        if due > self.expiry_boundary() {
            None
        } else {
            Some(due)
        }
    }

    fn due_at(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        date.and_hms_opt(self.time_of_day.hours(), self.time_of_day.minutes(), 0)
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}
