//! Season and weekday calendar helpers
//!
//! Pickup curves are keyed by day-of-week and season, and comparison
//! selection needs weekday-aligned prior-year dates. The season mapping is
//! meteorological (Dec-Feb is Winter and so on): hotel and restaurant
//! seasonality tracks weather quarters, not fiscal ones.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar season, derived deterministically from the month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// December, January, February
    Winter,
    /// March, April, May
    Spring,
    /// June, July, August
    Summer,
    /// September, October, November
    Autumn,
}

impl Season {
    /// Map a calendar month (1-12) to its season
    pub fn from_month(month: u32) -> Season {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Autumn,
        }
    }

    /// The season a date falls in
    pub fn of(date: NaiveDate) -> Season {
        Season::from_month(date.month())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Winter => write!(f, "winter"),
            Season::Spring => write!(f, "spring"),
            Season::Summer => write!(f, "summer"),
            Season::Autumn => write!(f, "autumn"),
        }
    }
}

/// Day-of-week number, 0-6 from Monday
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

/// The weekday-aligned prior-year analog of a date
///
/// 364 days is an exact number of weeks, so the weekday always matches -
/// including across leap years - and a snapshot at the same days-out value
/// was taken at the same weekday-aligned lead time.
pub fn prior_year_same_weekday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(364)
}

/// Whether two dates fall on the same weekday
pub fn same_weekday(a: NaiveDate, b: NaiveDate) -> bool {
    a.weekday() == b.weekday()
}

/// The weekday of a date
pub fn weekday_of(date: NaiveDate) -> Weekday {
    date.weekday()
}
