// src/dates.rs
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::FormatError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Day-of-week columns of a schedule, Monday first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
pub enum DayColumn {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

pub const DAY_COLUMNS: [DayColumn; 7] = [
    DayColumn::Mon,
    DayColumn::Tue,
    DayColumn::Wed,
    DayColumn::Thu,
    DayColumn::Fri,
    DayColumn::Sat,
    DayColumn::Sun,
];

impl DayColumn {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
            Self::Sat => "Sat",
            Self::Sun => "Sun",
        }
    }
}

impl From<Weekday> for DayColumn {
    fn from(value: Weekday) -> Self {
        DAY_COLUMNS[value.num_days_from_monday() as usize]
    }
}

/// Formats a date as the canonical `YYYY-MM-DD` key.
///
/// Only years 0 through 9999 produce a key that [`parse_date`] accepts back;
/// see [`is_storable`].
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Whether `date` has a four-digit year and so survives a format/parse round trip.
pub fn is_storable(date: NaiveDate) -> bool {
    (0..=9999).contains(&date.year())
}

/// Parses a canonical `YYYY-MM-DD` key.
///
/// Unlike `NaiveDate::parse_from_str`, this rejects unpadded components such
/// as `2024-1-5`, so that every accepted string round-trips through
/// [`format_date`].
/// # Errors
/// Returns `FormatError::InvalidDate` if the shape is wrong or the date does not exist.
pub fn parse_date(s: &str) -> Result<NaiveDate, FormatError> {
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(FormatError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| FormatError::InvalidDate(s.to_string()))
}

/// The Monday a plan created on `date` should start on.
/// A Monday maps to the following Monday, never to itself.
pub fn next_monday_on_or_after(date: NaiveDate) -> NaiveDate {
    let from_monday = i64::from(date.weekday().num_days_from_monday());
    date + Duration::days(7 - from_monday)
}

pub fn day_column(date: NaiveDate) -> DayColumn {
    DayColumn::from(date.weekday())
}

/// Whole calendar days from `start` to `target`, negative when `target` is earlier.
pub fn days_between(start: NaiveDate, target: NaiveDate) -> i64 {
    target.signed_duration_since(start).num_days()
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
