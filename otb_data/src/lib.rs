//! # OTB Data
//!
//! `otb_data` provides the core booking-data types for the InnPace demand
//! forecasting project: on-the-books (OTB) snapshot rows, the fixed
//! lead-time bucket schedule, metric types, and season/weekday calendar
//! helpers.
//!
//! An OTB snapshot records, for a future target date and a metric
//! (room-nights, covers, revenue, ...), how much business was already on
//! the books at a given lead time ("days out"). The snapshot job observes
//! each target date repeatedly as it approaches - monthly a year out,
//! weekly from about six months out, daily over the last month - and the
//! forecasting engine turns that history into booking-pace curves.
//!
//! ## Usage Example
//!
//! ```
//! use otb_data::{MetricType, SnapshotRow};
//! use otb_data::schedule::snapshot_buckets;
//! use chrono::NaiveDate;
//!
//! let row = SnapshotRow {
//!     target_date: NaiveDate::from_ymd_opt(2025, 8, 16).unwrap(),
//!     metric: MetricType::RoomNights,
//!     days_out: 30,
//!     value: 41.0,
//!     category: None,
//! };
//! assert!(snapshot_buckets().contains(&row.days_out));
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod calendar;
pub mod schedule;
pub mod utils;

pub use calendar::Season;

/// Errors that can occur when handling booking data
#[derive(Error, Debug)]
pub enum DataError {
    /// Unknown metric name encountered while parsing
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Error while loading snapshot data from a file
    #[error("Data loading error: {0}")]
    DataLoad(String),

    /// A value failed validation
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Result type for booking data operations
pub type Result<T> = std::result::Result<T, DataError>;

/// Forecastable demand metrics
///
/// Counts and monetary metrics flow through the same projection formulas;
/// the distinction only matters for output rounding and for confidence
/// shading, which applies to category-segmented revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    /// Occupied room-nights
    RoomNights,
    /// Occupancy percentage
    Occupancy,
    /// Restaurant covers
    Covers,
    /// Rooms revenue
    RoomsRevenue,
    /// Food & beverage revenue
    CoversRevenue,
}

impl MetricType {
    /// All supported metrics
    pub const ALL: [MetricType; 5] = [
        MetricType::RoomNights,
        MetricType::Occupancy,
        MetricType::Covers,
        MetricType::RoomsRevenue,
        MetricType::CoversRevenue,
    ];

    /// Decimal precision used when rounding a finished forecast.
    ///
    /// Rounding happens only at the final output step, never
    /// mid-calculation.
    pub fn decimals(&self) -> u32 {
        match self {
            MetricType::RoomNights | MetricType::Covers => 0,
            MetricType::Occupancy => 1,
            MetricType::RoomsRevenue | MetricType::CoversRevenue => 2,
        }
    }

    /// Whether the metric is monetary
    pub fn is_monetary(&self) -> bool {
        matches!(
            self,
            MetricType::RoomsRevenue | MetricType::CoversRevenue
        )
    }

    /// Stable identifier used in files and explanations
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::RoomNights => "room_nights",
            MetricType::Occupancy => "occupancy",
            MetricType::Covers => "covers",
            MetricType::RoomsRevenue => "rooms_revenue",
            MetricType::CoversRevenue => "covers_revenue",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "room_nights" => Ok(MetricType::RoomNights),
            "occupancy" => Ok(MetricType::Occupancy),
            "covers" => Ok(MetricType::Covers),
            "rooms_revenue" => Ok(MetricType::RoomsRevenue),
            "covers_revenue" => Ok(MetricType::CoversRevenue),
            other => Err(DataError::UnknownMetric(other.to_string())),
        }
    }
}

/// One observed snapshot value
///
/// A row states: for `target_date` and `metric`, `value` was on the books
/// `days_out` days before the target date. Rows carrying a `category` are
/// inventory-segmented (for example per room type) and feed the v2
/// confidence shading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    /// Stay/service date the bookings are for
    pub target_date: NaiveDate,
    /// Metric being observed
    pub metric: MetricType,
    /// Lead time of the observation in days
    pub days_out: u16,
    /// On-the-books value at that lead time
    pub value: f64,
    /// Optional inventory category (room type etc.)
    #[serde(default)]
    pub category: Option<String>,
}

/// A realized final value for a completed target date
///
/// Supplied by the final-value source once the target date has passed.
/// Finals are kept apart from day-zero snapshots: same-day sales and
/// no-shows mean the two can legitimately differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalValue {
    /// The completed stay/service date
    pub target_date: NaiveDate,
    /// Metric the final belongs to
    pub metric: MetricType,
    /// Realized actual value
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_round_trips_through_str() {
        for metric in MetricType::ALL {
            assert_eq!(metric.as_str().parse::<MetricType>().unwrap(), metric);
        }
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let err = "room_rates".parse::<MetricType>().unwrap_err();
        assert!(matches!(err, DataError::UnknownMetric(_)));
    }

    #[test]
    fn monetary_metrics_round_to_pennies() {
        assert_eq!(MetricType::RoomsRevenue.decimals(), 2);
        assert_eq!(MetricType::RoomNights.decimals(), 0);
        assert!(MetricType::CoversRevenue.is_monetary());
        assert!(!MetricType::Covers.is_monetary());
    }
}
