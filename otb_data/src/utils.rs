//! Utility functions for booking snapshot data
//!
//! This module provides helpers for loading snapshot history from CSV files
//! and for generating synthetic booking histories used by tests and
//! examples.

use crate::schedule::snapshot_buckets;
use crate::{DataError, FinalValue, MetricType, SnapshotRow};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};
use std::path::Path;

/// Load snapshot rows from a CSV file
///
/// The expected CSV format is:
/// target_date,metric,days_out,value,category
/// 2025-08-16,room_nights,30,41.0,
///
/// The `category` column may be omitted entirely or left empty for
/// unsegmented rows. Rows are returned sorted by target date, then by
/// descending days-out (observation order).
///
/// # Arguments
/// * `file_path` - Path to the CSV file
///
/// # Returns
/// * `Result<Vec<SnapshotRow>, DataError>` - Loaded rows or error
pub fn load_snapshot_rows<P: AsRef<Path>>(file_path: P) -> Result<Vec<SnapshotRow>, DataError> {
    let mut reader = csv::Reader::from_path(&file_path)
        .map_err(|e| DataError::DataLoad(format!("Failed to open file: {}", e)))?;

    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<SnapshotRow>().enumerate() {
        let row = record
            .map_err(|e| DataError::DataLoad(format!("Error reading record {}: {}", i + 1, e)))?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(DataError::DataLoad("No data found in file".to_string()));
    }

    rows.sort_by(|a, b| {
        a.target_date
            .cmp(&b.target_date)
            .then(b.days_out.cmp(&a.days_out))
    });

    Ok(rows)
}

/// Load realized final values from a CSV file
///
/// The expected CSV format is:
/// target_date,metric,value
/// 2025-08-16,room_nights,44.0
pub fn load_final_values<P: AsRef<Path>>(file_path: P) -> Result<Vec<FinalValue>, DataError> {
    let mut reader = csv::Reader::from_path(&file_path)
        .map_err(|e| DataError::DataLoad(format!("Failed to open file: {}", e)))?;

    let mut finals = Vec::new();
    for (i, record) in reader.deserialize::<FinalValue>().enumerate() {
        let row = record
            .map_err(|e| DataError::DataLoad(format!("Error reading record {}: {}", i + 1, e)))?;
        finals.push(row);
    }

    finals.sort_by_key(|f| f.target_date);
    Ok(finals)
}

/// A synthetic booking history: snapshot rows plus realized finals
#[derive(Debug, Clone)]
pub struct GeneratedHistory {
    /// Snapshot rows for every scheduled bucket of every date
    pub rows: Vec<SnapshotRow>,
    /// Realized final value per date
    pub finals: Vec<FinalValue>,
}

/// Fraction of the eventual demand typically booked at a lead time
fn booked_fraction(days_out: u16) -> f64 {
    1.0 / (1.0 + (days_out as f64 / 30.0).powf(1.2))
}

/// Weekend and shoulder-day demand multipliers
fn weekday_factor(date: NaiveDate) -> f64 {
    match date.weekday() {
        Weekday::Fri | Weekday::Sat => 1.3,
        Weekday::Sun | Weekday::Mon => 0.85,
        _ => 1.0,
    }
}

fn season_factor(date: NaiveDate) -> f64 {
    match crate::Season::of(date) {
        crate::Season::Summer => 1.25,
        crate::Season::Winter => 0.8,
        _ => 1.0,
    }
}

/// Generate a synthetic booking history for testing and examples
///
/// Demand per date follows weekday and season factors around `base_final`,
/// and the on-the-books value at each scheduled lead time is drawn from a
/// Poisson distribution around the typical booked fraction, so curves built
/// from the output carry realistic sampling noise. Realized finals wobble a
/// little around the day-zero position (no-shows, same-day sales), which
/// occasionally pushes a curve ratio above 1.0 - as in real data.
///
/// # Arguments
/// * `metric` - Metric to generate rows for
/// * `start` - First target date
/// * `days` - Number of consecutive target dates
/// * `base_final` - Baseline demand level per date
/// * `seed` - RNG seed, fixed so tests are reproducible
///
/// # Returns
/// * `GeneratedHistory` - Snapshot rows and finals, in date order
pub fn generate_booking_history(
    metric: MetricType,
    start: NaiveDate,
    days: usize,
    base_final: f64,
    seed: u64,
) -> GeneratedHistory {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(days * 58);
    let mut finals = Vec::with_capacity(days);

    // Monetary metrics are modeled as counts times an average spend
    let spend = if metric.is_monetary() { 120.0 } else { 1.0 };

    for offset in 0..days {
        let target_date = start + Duration::days(offset as i64);
        let expected_final =
            base_final * weekday_factor(target_date) * season_factor(target_date);
        let final_target = expected_final * rng.gen_range(0.95..1.05);

        let mut day_zero = 0.0;
        for days_out in snapshot_buckets() {
            let lambda = (final_target * booked_fraction(days_out)).max(0.1);
            let poisson = Poisson::new(lambda).expect("positive lambda");
            let count: f64 = poisson.sample(&mut rng);
            let value = count * spend;
            if days_out == 0 {
                day_zero = value;
            }
            rows.push(SnapshotRow {
                target_date,
                metric,
                days_out,
                value,
                category: None,
            });
        }

        // No-shows pull the final below day-zero OTB; same-day walk-ins
        // push it above
        let final_value = (day_zero * rng.gen_range(0.96..1.03)).round();
        finals.push(FinalValue {
            target_date,
            metric,
            value: final_value.max(0.0),
        });
    }

    GeneratedHistory { rows, finals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn loads_rows_with_and_without_category() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "target_date,metric,days_out,value,category").unwrap();
        writeln!(file, "2025-08-16,room_nights,30,41.0,").unwrap();
        writeln!(file, "2025-08-16,rooms_revenue,30,2325.0,standard").unwrap();
        writeln!(file, "2025-08-16,room_nights,37,38.0,").unwrap();

        let rows = load_snapshot_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 3);
        // Sorted by date then descending days-out
        assert_eq!(rows[0].days_out, 37);
        assert_eq!(rows[0].category, None);
        assert_eq!(rows[2].category.as_deref(), Some("standard"));
    }

    #[test]
    fn loads_final_values_in_date_order() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "target_date,metric,value").unwrap();
        writeln!(file, "2025-08-17,room_nights,39.0").unwrap();
        writeln!(file, "2025-08-16,room_nights,44.0").unwrap();

        let finals = load_final_values(file.path()).unwrap();
        assert_eq!(finals.len(), 2);
        assert_eq!(finals[0].target_date, date(2025, 8, 16));
        assert_eq!(finals[0].value, 44.0);
    }

    #[test]
    fn empty_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "target_date,metric,days_out,value,category").unwrap();
        assert!(load_snapshot_rows(file.path()).is_err());
    }

    #[test]
    fn generated_history_covers_the_full_schedule() {
        let history =
            generate_booking_history(MetricType::Covers, date(2024, 1, 1), 14, 60.0, 7);
        assert_eq!(history.rows.len(), 14 * 58);
        assert_eq!(history.finals.len(), 14);
        assert!(history.finals.iter().all(|f| f.value >= 0.0));
    }

    #[test]
    fn generation_is_reproducible_for_a_seed() {
        let a = generate_booking_history(MetricType::RoomNights, date(2024, 3, 1), 7, 40.0, 42);
        let b = generate_booking_history(MetricType::RoomNights, date(2024, 3, 1), 7, 40.0, 42);
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.finals, b.finals);
    }

    #[test]
    fn booked_fraction_rises_toward_the_target_date() {
        assert!(booked_fraction(0) > booked_fraction(30));
        assert!(booked_fraction(30) > booked_fraction(177));
        assert!(booked_fraction(177) > booked_fraction(365));
        assert!((booked_fraction(0) - 1.0).abs() < 1e-12);
    }
}
